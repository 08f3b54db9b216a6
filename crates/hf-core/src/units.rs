// hf-core/src/units.rs

use uom::si::f64::{
    Length as UomLength, Pressure as UomPressure, Ratio as UomRatio, Time as UomTime,
    Velocity as UomVelocity, VolumeRate as UomVolumeRate,
};

// Public canonical unit types (SI, f64)
pub type Length = UomLength;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Time = UomTime;
pub type Velocity = UomVelocity;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn mmhg(v: f64) -> Pressure {
    use uom::si::pressure::millimeter_of_mercury;
    Pressure::new::<millimeter_of_mercury>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn um(v: f64) -> Length {
    use uom::si::length::micrometer;
    Length::new::<micrometer>(v)
}

#[inline]
pub fn m3ps(v: f64) -> VolumeRate {
    use uom::si::volume_rate::cubic_meter_per_second;
    VolumeRate::new::<cubic_meter_per_second>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

pub mod constants {
    /// Dynamic viscosity of blood plasma (Pa s).
    pub const PLASMA_VISCOSITY_PA_S: f64 = 1.2e-3;

    /// Meter-to-micrometer scale for the empirical vessel laws.
    pub const M_TO_UM: f64 = 1.0e6;
}
