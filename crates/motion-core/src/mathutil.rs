//! Small `f32` math shim so the rest of the crate can call `sqrtf`/`roundf`
//! without sprinkling `cfg` everywhere. Mirrors the `std`/`libm` split the
//! teacher's `motion` crate used for `kinematics.rs`/`planner.rs`.

#[cfg(feature = "std")]
pub fn sqrtf(x: f32) -> f32 {
    x.sqrt()
}

#[cfg(not(feature = "std"))]
pub fn sqrtf(x: f32) -> f32 {
    libm::sqrtf(x)
}

#[cfg(feature = "std")]
pub fn roundf(x: f32) -> f32 {
    x.round()
}

#[cfg(not(feature = "std"))]
pub fn roundf(x: f32) -> f32 {
    libm::roundf(x)
}
