mod credentials;
mod layer;

pub(crate) use layer::*;
