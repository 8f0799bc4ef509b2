//! Article payloads, submitted either as JSON or as a multipart form.
//!
//! Both encodings carry the same fields. In a form the author is sent as
//! `autor[nome]` / `autor[avatar]` and the body as `texto[0]`, `texto[1]`, ...;
//! a file under `texto[N]` is an embedded image and a file under `imagem` is
//! the cover. JSON uses a nested `autor` object (the bracketed keys are also
//! accepted) and a plain `texto` array, and cannot carry files.

use artigos_core::{ArtigoDraft, Autor, Error, Result, TextoItem, Upload};
use axum::{
    async_trait,
    body::Bytes,
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

use crate::error::ApiError;

/// A parsed article submission. `id` is only meaningful for updates.
#[derive(Debug, Default)]
pub struct ArtigoForm {
    pub id: Option<String>,
    pub draft: ArtigoDraft,
}

#[async_trait]
impl<S> FromRequest<S> for ArtigoForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state).await.map_err(|e| {
                ApiError::new(e.status(), format!("Invalid multipart body: {}", e.body_text()))
            })?;
            from_multipart(multipart).await
        } else if is_json(&content_type) {
            let body = Bytes::from_request(req, state).await.map_err(|e| {
                ApiError::new(e.status(), format!("Invalid request body: {}", e.body_text()))
            })?;
            let value: Value = serde_json::from_slice(&body)
                .map_err(|_| ApiError::bad_request("Invalid article data"))?;
            Ok(from_json(value)?)
        } else {
            Err(ApiError::bad_request("Unsupported content type"))
        }
    }
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Build a form from a JSON document, which must be an object.
pub fn from_json(value: Value) -> Result<ArtigoForm> {
    let Value::Object(obj) = value else {
        return Err(Error::validation("Invalid article data"));
    };

    let id = match obj.get("id") {
        None | Some(Value::Null) => None,
        Some(value) => Some(scalar_text("id", value)?),
    };

    let index = match obj.get("index") {
        None | Some(Value::Null) => 0,
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| Error::validation("index must be an integer"))?,
        Some(Value::String(s)) => parse_index(s)?,
        Some(_) => return Err(Error::validation("index must be an integer")),
    };

    let autor = match obj.get("autor") {
        Some(Value::Object(autor)) => Autor {
            nome: text_field(autor, "nome")?,
            avatar: text_field(autor, "avatar")?,
        },
        None | Some(Value::Null) => Autor {
            nome: text_field(&obj, "autor[nome]")?,
            avatar: text_field(&obj, "autor[avatar]")?,
        },
        Some(_) => return Err(Error::validation("autor must be an object")),
    };

    let texto = match obj.get("texto") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| scalar_text("texto", item).map(TextoItem::Text))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(Error::validation("texto must be a list")),
    };

    Ok(ArtigoForm {
        id,
        draft: ArtigoDraft {
            index,
            titulo: text_field(&obj, "titulo")?,
            sumario: text_field(&obj, "sumario")?,
            assunto: text_field(&obj, "assunto")?,
            slug: text_field(&obj, "slug")?,
            data: text_field(&obj, "data")?,
            autor,
            texto,
            imagem: None,
        },
    })
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Result<String> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(value) => scalar_text(key, value),
    }
}

/// Strings pass through; numbers and booleans are written out as text.
fn scalar_text(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(Error::validation(format!("{} must be a string", key))),
    }
}

fn parse_index(raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse()
        .map_err(|_| Error::validation("index must be an integer"))
}

/// Raw multipart fields. Repeated text fields keep their first value.
#[derive(Debug, Default)]
pub struct FormFields {
    pub text: HashMap<String, String>,
    pub files: HashMap<String, Upload>,
}

impl FormFields {
    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.text.entry(name.into()).or_insert_with(|| value.into());
    }

    /// File inputs left empty by the browser arrive with an empty filename
    /// and are dropped.
    pub fn push_file(&mut self, name: impl Into<String>, upload: Upload) {
        if !upload.filename.is_empty() {
            self.files.insert(name.into(), upload);
        }
    }
}

/// Keeps the status multer assigns, so an oversized body is a 413 rather
/// than a parse failure.
fn multipart_error(context: &str, err: MultipartError) -> ApiError {
    ApiError::new(err.status(), format!("{}: {}", context, err.body_text()))
}

async fn from_multipart(mut multipart: Multipart) -> std::result::Result<ArtigoForm, ApiError> {
    let mut fields = FormFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart body", e))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(&format!("Invalid upload {}", name), e))?;
                fields.push_file(name, Upload::new(filename, bytes.to_vec()));
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(&format!("Invalid field {}", name), e))?;
                fields.push_text(name, value);
            }
        }
    }

    Ok(from_form_fields(fields)?)
}

/// Build a form from flat multipart fields.
pub fn from_form_fields(mut fields: FormFields) -> Result<ArtigoForm> {
    let id = fields.text.remove("id");
    let mut take = |key: &str| fields.text.remove(key).unwrap_or_default();

    let index = parse_index(&take("index"))?;
    let titulo = take("titulo");
    let sumario = take("sumario");
    let assunto = take("assunto");
    let slug = take("slug");
    let data = take("data");
    let autor = Autor {
        nome: take("autor[nome]"),
        avatar: take("autor[avatar]"),
    };

    // Keyed by position so texto[10] sorts after texto[2]; unnumbered
    // entries follow the numbered ones in key order.
    let mut texto: BTreeMap<(Option<usize>, String), TextoItem> = BTreeMap::new();
    for (key, value) in fields.text.drain() {
        if let Some(position) = texto_position(&key) {
            texto.insert((position, key), TextoItem::Text(value));
        }
    }
    let imagem = fields.files.remove("imagem");
    for (key, upload) in fields.files.drain() {
        if let Some(position) = texto_position(&key) {
            texto.insert((position, key), TextoItem::Upload(upload));
        }
    }

    let mut texto: Vec<_> = texto.into_iter().collect();
    texto.sort_by_key(|((position, _), _)| position.is_none());

    Ok(ArtigoForm {
        id,
        draft: ArtigoDraft {
            index,
            titulo,
            sumario,
            assunto,
            slug,
            data,
            autor,
            texto: texto.into_iter().map(|(_, item)| item).collect(),
            imagem,
        },
    })
}

/// `Some(Some(n))` for `texto[n]`, `Some(None)` for any other `texto[...`
/// key, `None` when the key is not a texto entry.
fn texto_position(key: &str) -> Option<Option<usize>> {
    let rest = key.strip_prefix("texto[")?;
    Some(rest.strip_suffix(']').and_then(|n| n.parse().ok()))
}
