pub(crate) mod camera;
pub(crate) mod clock;
pub(crate) mod controller;
