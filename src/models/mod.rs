mod order;
mod payment;
mod redirect;

pub use order::*;
pub use payment::*;
pub use redirect::*;
