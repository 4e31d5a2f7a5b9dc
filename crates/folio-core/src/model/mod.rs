pub mod creator;
pub mod work;

pub use creator::Creator;
pub use work::Work;
