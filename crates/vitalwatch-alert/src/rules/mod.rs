pub mod blood_pressure;
pub mod heart_rate;
pub mod hypotensive_hypoxemia;
pub mod saturation;
