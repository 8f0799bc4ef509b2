pub mod error;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use storage::ArtigoStorage;
pub use types::{Artigo, ArtigoDraft, Autor, TextoItem, Upload};

pub mod prelude {
    pub use crate::{Artigo, ArtigoDraft, ArtigoStorage, Autor, Error, Result, TextoItem, Upload};
}
