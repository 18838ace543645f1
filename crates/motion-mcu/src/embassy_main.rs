//! # Embassy Main
//!
//! Entry point for the Embassy-executor build. The pulse timer ISR is bound
//! directly with `#[interrupt]` rather than through the async executor — it
//! has to run at the actual step rate, which can be far faster than
//! anything an async task should be scheduled at. Everything else (the
//! 500 µs integration tick, switch polling, the watchdog feed, the status
//! LED) runs as ordinary Embassy tasks.

use core::cell::{Cell, RefCell};

use critical_section::Mutex;
use embassy_executor::Spawner;
use embassy_stm32::gpio::Output;
use embassy_stm32::interrupt;
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_stm32::Config;
use motion_core::{MotionController, MotionParameters};
use static_cell::StaticCell;

use crate::safety::{RawWatchdog, WatchdogSupervisor};
use crate::stepper::{integrator_task, HardwareStepTimer, PulseContext, PulseOutputAdapter, RawPulseTimer, SwitchGroup};
use boards::stm32f407::pins::BoardPins;

type BoardPulseContext = PulseContext<Tim3Register, Output<'static>, Output<'static>, Output<'static>>;

static CONTROLLER: StaticCell<MotionController> = StaticCell::new();
static CONTROLLER_REF: Mutex<Cell<Option<&'static MotionController>>> = Mutex::new(Cell::new(None));
static PULSE_CTX: Mutex<RefCell<Option<BoardPulseContext>>> = Mutex::new(RefCell::new(None));

/// Thin wrapper around the pulse timer's raw registers. `embassy_stm32`'s
/// low-level timer handle shape varies across point releases; this crate
/// only relies on the three register operations `RawPulseTimer` names, kept
/// behind this wrapper so a board bring-up only has to adjust this impl.
pub struct Tim3Register {
    timer: embassy_stm32::timer::low_level::Timer<'static, embassy_stm32::peripherals::TIM3>,
}

impl RawPulseTimer for Tim3Register {
    fn set_auto_reload(&mut self, ticks: u16) {
        self.timer.set_autoreload_value(ticks as u32);
    }
    fn enable_counter(&mut self) {
        self.timer.enable_update_interrupt(true);
        self.timer.start();
    }
    fn disable_counter(&mut self) {
        self.timer.stop();
    }
}

impl RawWatchdog for IndependentWatchdog<'static> {
    fn unleash(&mut self) {
        IndependentWatchdog::unleash(self);
    }
    fn feed(&mut self) {
        IndependentWatchdog::pet(self);
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    defmt::info!("motion-mcu starting (embassy runtime)");

    let p = embassy_stm32::init(Config::default());
    let board_pins = BoardPins::new(p);

    let controller = CONTROLLER.init(MotionController::new(MotionParameters::default()));
    critical_section::with(|cs| CONTROLLER_REF.borrow(cs).set(Some(controller)));

    let raw_timer = embassy_stm32::timer::low_level::Timer::new(p.TIM3);
    let pulse_out = PulseOutputAdapter::new(board_pins.step, board_pins.dir, board_pins.enable);
    let pulse_ctx = PulseContext { timer: HardwareStepTimer::new(Tim3Register { timer: raw_timer }), pulse_out };
    critical_section::with(|cs| *PULSE_CTX.borrow(cs).borrow_mut() = Some(pulse_ctx));

    let switches = SwitchGroup::new(board_pins.stop_switch, board_pins.home_switch);
    let watchdog = WatchdogSupervisor::new(IndependentWatchdog::new(p.IWDG, 25_000));

    unsafe { cortex_m::peripheral::NVIC::unmask(embassy_stm32::interrupt::TIM3) };

    spawner.spawn(integrator_task(controller, &PULSE_CTX, switches, watchdog)).unwrap();
    spawner.spawn(led_task(board_pins.led)).unwrap();

    defmt::info!("motion-mcu tasks running");
}

/// The step-pulse ISR (C1). The original firmware splits this across two
/// vectors, `TCC0_OVF_vect` (latches the next period) and `TCC0_CCA_vect`
/// (advances the step and checks for arrival); exactly which hardware
/// status bit tells them apart is timer-peripheral-specific register
/// plumbing, so this binding dispatches on `HardwareStepTimer::is_running`
/// as a stand-in until a board bring-up wires the real status flag.
#[interrupt]
fn TIM3() {
    critical_section::with(|cs| {
        let mut ctx_slot = PULSE_CTX.borrow(cs).borrow_mut();
        let controller = CONTROLLER_REF.borrow(cs).get();
        if let (Some(ctx), Some(controller)) = (ctx_slot.as_mut(), controller) {
            if ctx.timer.is_running() {
                controller.on_pulse_compare(&mut ctx.timer, &mut ctx.pulse_out);
            } else {
                controller.on_timer_overflow(&mut ctx.timer);
            }
        }
    });
}

#[embassy_executor::task]
async fn led_task(led_pin: Output<'static>) {
    let mut led = led_pin;
    loop {
        led.toggle();
        embassy_time::Timer::after(embassy_time::Duration::from_millis(500)).await;
    }
}
