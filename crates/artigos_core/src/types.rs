use serde::{Deserialize, Serialize};
use std::fmt;

/// A stored article.
///
/// Every field has a default so documents written by older versions of the
/// service, which stored whatever the client posted, still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Artigo {
    pub id: String,
    pub index: i64,
    pub titulo: String,
    pub sumario: String,
    pub assunto: String,
    pub slug: String,
    pub data: String,
    pub autor: Autor,
    pub texto: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagem: Option<String>,
}

impl Artigo {
    /// Cover image followed by every `texto` entry, in order.
    ///
    /// Callers decide which of these are actually image paths.
    pub fn image_references(&self) -> impl Iterator<Item = &str> {
        self.imagem
            .as_deref()
            .into_iter()
            .chain(self.texto.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Autor {
    pub nome: String,
    pub avatar: String,
}

/// Client-supplied article fields, before the repository assigns `id` and
/// stores any uploaded files.
#[derive(Debug, Clone, Default)]
pub struct ArtigoDraft {
    /// Ignored on create, where the index is derived from the collection size.
    pub index: i64,
    pub titulo: String,
    pub sumario: String,
    pub assunto: String,
    pub slug: String,
    pub data: String,
    pub autor: Autor,
    pub texto: Vec<TextoItem>,
    /// New cover image, if one was uploaded.
    pub imagem: Option<Upload>,
}

/// One body entry: plain text, or an image to be stored and referenced by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextoItem {
    Text(String),
    Upload(Upload),
}

impl From<&str> for TextoItem {
    fn from(text: &str) -> Self {
        TextoItem::Text(text.to_string())
    }
}

impl From<String> for TextoItem {
    fn from(text: String) -> Self {
        TextoItem::Text(text)
    }
}

/// An uploaded file held in memory until the repository writes it out.
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    /// Filename as sent by the client, not yet sanitized.
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_sparse_record() {
        let artigo: Artigo = serde_json::from_str(r#"{"id":"abc","titulo":"Olá"}"#).unwrap();
        assert_eq!(artigo.id, "abc");
        assert_eq!(artigo.titulo, "Olá");
        assert_eq!(artigo.index, 0);
        assert!(artigo.texto.is_empty());
        assert_eq!(artigo.autor, Autor::default());
        assert_eq!(artigo.imagem, None);
    }

    #[test]
    fn test_imagem_omitted_when_absent() {
        let artigo = Artigo {
            id: "x".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&artigo).unwrap();
        assert!(value.get("imagem").is_none());
        assert_eq!(value["autor"]["nome"], "");
    }

    #[test]
    fn test_image_references_order() {
        let artigo = Artigo {
            imagem: Some("/images/capa.png".to_string()),
            texto: vec!["intro".to_string(), "/images/fig.png".to_string()],
            ..Default::default()
        };
        let refs: Vec<&str> = artigo.image_references().collect();
        assert_eq!(refs, vec!["/images/capa.png", "intro", "/images/fig.png"]);
    }
}
