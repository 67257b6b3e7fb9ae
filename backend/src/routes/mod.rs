pub(crate) mod correlation;
pub(crate) mod health;
pub(crate) mod params;
pub(crate) mod stocks;
