mod named;
pub(crate) mod rgba;
pub(crate) mod space;
