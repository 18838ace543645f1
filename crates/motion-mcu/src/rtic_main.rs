//! # RTIC-based Firmware Entry Point
//!
//! The RTIC alternative to `embassy_main`: the pulse timer and both switch
//! inputs are bound as genuine hardware tasks rather than polled from an
//! async loop, and the 500 µs integration tick runs as a `Systick`-delayed
//! software task at the next priority down.

#![allow(unused_imports)]

#[rtic::app(device = stm32f4xx_hal::pac, dispatchers = [EXTI0, EXTI1, EXTI2, EXTI3])]
mod app {
    use stm32f4xx_hal::{
        gpio::{gpioa, gpiob, gpiod, Edge, ExtiPin, Input, Output, PullUp, PushPull},
        pac::TIM3,
        prelude::*,
        timer::{CounterUs, Event as TimerEvent},
        watchdog::IndependentWatchdog,
    };
    use rtic_monotonics::{systick::*, Monotonic};

    use crate::safety::{RawWatchdog, WatchdogSupervisor};
    use crate::stepper::{HardwareStepTimer, PulseOutputAdapter, RawPulseTimer, SwitchGroup};
    use motion_core::{MotionController, MotionParameters};

    type StepPin = gpioa::PA0<Output<PushPull>>;
    type DirPin = gpioa::PA1<Output<PushPull>>;
    type EnablePin = gpioa::PA2<Output<PushPull>>;
    type SwitchPin = gpiob::PB0<Input<PullUp>>;
    type LedPin = gpiod::PD12<Output<PushPull>>;

    /// Bridges RTIC's `CounterUs` to [`RawPulseTimer`] the same way
    /// `embassy_main::Tim3Register` bridges the Embassy low-level timer —
    /// both runtimes share `HardwareStepTimer`, only this adapter differs.
    pub struct RticTimerRegister {
        counter: CounterUs<TIM3>,
    }
    impl RawPulseTimer for RticTimerRegister {
        fn set_auto_reload(&mut self, ticks: u16) {
            let _ = self.counter.start((ticks as u32).micros());
        }
        fn enable_counter(&mut self) {
            self.counter.listen(TimerEvent::Update);
        }
        fn disable_counter(&mut self) {
            self.counter.unlisten(TimerEvent::Update);
            self.counter.cancel().ok();
        }
    }

    impl RawWatchdog for IndependentWatchdog {
        fn unleash(&mut self) {
            IndependentWatchdog::start(self, 25.millis());
        }
        fn feed(&mut self) {
            IndependentWatchdog::feed(self);
        }
    }

    // `pulse_timer`/`pulse_out` are shared rather than local because both
    // the real-time pulse ISR and the switch-triggered abort path in the
    // integrator tick need to reach them; RTIC's priority-ceiling lock
    // gives the same mutual exclusion `critical_section` gives the Embassy
    // build's equivalent `PulseContext`.
    #[shared]
    struct Shared {
        controller: &'static MotionController,
        pulse_timer: HardwareStepTimer<RticTimerRegister>,
        pulse_out: PulseOutputAdapter<StepPin, DirPin, EnablePin>,
    }

    #[local]
    struct Local {
        led: LedPin,
        switches: SwitchGroup<SwitchPin>,
        watchdog: WatchdogSupervisor<IndependentWatchdog>,
    }

    #[init]
    fn init(cx: init::Context) -> (Shared, Local) {
        defmt::info!("motion-mcu starting (rtic runtime)");
        let dp = cx.device;

        let rcc = dp.RCC.constrain();
        let clocks = rcc.cfgr.use_hse(8.MHz()).sysclk(168.MHz()).freeze();

        let systick_mono_token = rtic_monotonics::create_systick_token!();
        Systick::start(cx.core.SYST, clocks.hclk().0, systick_mono_token);

        let gpioa = dp.GPIOA.split();
        let gpiob = dp.GPIOB.split();
        let gpiod = dp.GPIOD.split();

        let step = gpioa.pa0.into_push_pull_output();
        let dir = gpioa.pa1.into_push_pull_output();
        let enable = gpioa.pa2.into_push_pull_output();
        let mut stop_switch = gpiob.pb0.into_pull_up_input();
        let mut home_switch = gpiob.pb1.into_pull_up_input();
        let mut led = gpiod.pd12.into_push_pull_output();
        led.set_high();

        stop_switch.make_interrupt_source(&mut dp.SYSCFG.constrain());
        stop_switch.enable_interrupt(&mut dp.EXTI);
        stop_switch.trigger_on_edge(&mut dp.EXTI, Edge::Falling);
        home_switch.make_interrupt_source(&mut dp.SYSCFG.constrain());
        home_switch.enable_interrupt(&mut dp.EXTI);
        home_switch.trigger_on_edge(&mut dp.EXTI, Edge::Falling);

        let pulse_timer = HardwareStepTimer::new(RticTimerRegister { counter: dp.TIM3.counter_us(&clocks) });
        let pulse_out = PulseOutputAdapter::new(step, dir, enable);
        let switches = SwitchGroup::new(stop_switch, home_switch);
        let watchdog = WatchdogSupervisor::new(IndependentWatchdog::new(dp.IWDG));

        let controller: &'static MotionController =
            cortex_m::singleton!(: MotionController = MotionController::new(MotionParameters::default())).unwrap();

        integrator_tick::spawn().ok();

        defmt::info!("motion-mcu tasks running");

        (Shared { controller, pulse_timer, pulse_out }, Local { led, switches, watchdog })
    }

    #[idle(local = [led])]
    fn idle(cx: idle::Context) -> ! {
        loop {
            cortex_m::asm::wfi();
        }
    }

    /// Real-time pulse ISR. Highest priority: pulse timing accuracy depends
    /// on this preempting everything else. Dispatches on `is_running` the
    /// same way `embassy_main::TIM3` does, as a stand-in for the real
    /// overflow/compare-match status flag.
    #[task(binds = TIM3, shared = [controller, pulse_timer, pulse_out], priority = 4)]
    fn pulse_isr(cx: pulse_isr::Context) {
        (cx.shared.controller, cx.shared.pulse_timer, cx.shared.pulse_out).lock(|controller, timer, pulse_out| {
            if timer.is_running() {
                controller.on_pulse_compare(timer, pulse_out);
            } else {
                controller.on_timer_overflow(timer);
            }
        });
    }

    /// 500 µs trajectory integration tick, re-armed at the end of each run.
    /// Also polls the switches and feeds the watchdog, so a hang here (not
    /// the pulse ISR, which stays independent) is what trips the reset.
    #[task(shared = [controller, pulse_timer, pulse_out], local = [switches, watchdog], priority = 2)]
    async fn integrator_tick(mut cx: integrator_tick::Context) {
        loop {
            let (rising, falling) = cx.local.switches.transitions();
            (cx.shared.controller, cx.shared.pulse_timer, cx.shared.pulse_out).lock(|controller, timer, pulse_out| {
                if rising[SwitchGroup::<SwitchPin>::STOP] {
                    controller.on_stop_switch_triggered(true, timer, pulse_out);
                } else if falling[SwitchGroup::<SwitchPin>::STOP] {
                    controller.on_stop_switch_triggered(false, timer, pulse_out);
                }
                if rising[SwitchGroup::<SwitchPin>::HOME] {
                    controller.on_home_switch_triggered(timer, pulse_out);
                }
            });
            cx.shared.controller.lock(|controller| {
                controller.tick_500us();
                controller.decay_home_debounce();
                let tick_events = controller.drain_tick();
                if !tick_events.is_empty() {
                    defmt::debug!("tick events: {}", tick_events);
                }
            });
            cx.local.watchdog.feed();
            Systick::delay(500.micros()).await;
        }
    }
}
