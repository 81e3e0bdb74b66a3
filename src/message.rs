//! Message descriptions and their normalization into one multipart body.

use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::embed::EmbedBuilder;
use crate::error::Result;
use crate::types::Embed;

/// A binary attachment uploaded with a message. Consumed by the send; the
/// bytes are not retained after the request.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Name used as both multipart part name and filename
    pub name: String,

    /// Raw file bytes
    pub data: Vec<u8>,
}

impl FileUpload {
    /// Create an upload from a name and bytes.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// An embed slot on a message: either plain data or a builder still
/// carrying it. Normalization unwraps builders so only plain data reaches
/// the serialized payload.
#[derive(Debug, Clone)]
pub enum EmbedSource {
    /// A finished embed structure.
    Plain(Embed),
    /// A builder whose accumulated embed is unwrapped at send time.
    Builder(EmbedBuilder),
}

impl EmbedSource {
    fn into_embed(self) -> Embed {
        match self {
            Self::Plain(embed) => embed,
            Self::Builder(builder) => builder.build(),
        }
    }
}

impl From<Embed> for EmbedSource {
    fn from(embed: Embed) -> Self {
        Self::Plain(embed)
    }
}

impl From<EmbedBuilder> for EmbedSource {
    fn from(builder: EmbedBuilder) -> Self {
        Self::Builder(builder)
    }
}

/// Description of a message to create. All fields are optional; a fully
/// empty description still produces a valid request (the server, not the
/// client, rejects empty messages).
#[derive(Debug, Clone, Default)]
pub struct CreateMessage {
    /// Plain text content
    pub content: Option<String>,

    /// Single file attachment
    pub file: Option<FileUpload>,

    /// Additional file attachments, order preserved
    pub files: Vec<FileUpload>,

    /// Single embed
    pub embed: Option<EmbedSource>,

    /// Additional embeds, order preserved
    pub embeds: Vec<EmbedSource>,
}

impl CreateMessage {
    /// Create an empty description.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text content.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the single file attachment.
    #[must_use]
    pub fn file(mut self, file: FileUpload) -> Self {
        self.file = Some(file);
        self
    }

    /// Append a file to the plural attachment list.
    #[must_use]
    pub fn add_file(mut self, file: FileUpload) -> Self {
        self.files.push(file);
        self
    }

    /// Set the single embed.
    #[must_use]
    pub fn embed(mut self, embed: impl Into<EmbedSource>) -> Self {
        self.embed = Some(embed.into());
        self
    }

    /// Append an embed to the plural list.
    #[must_use]
    pub fn add_embed(mut self, embed: impl Into<EmbedSource>) -> Self {
        self.embeds.push(embed.into());
        self
    }

    /// Split the description into the JSON payload and the ordered file
    /// parts. The single `file` slot comes first, then `files` in order;
    /// embed builders are unwrapped to plain structures, `embeds` keeping
    /// their supplied order.
    pub(crate) fn normalize(self) -> (MessagePayload, Vec<FileUpload>) {
        let mut uploads = Vec::with_capacity(self.files.len() + usize::from(self.file.is_some()));
        if let Some(file) = self.file {
            uploads.push(file);
        }
        uploads.extend(self.files);

        let payload = MessagePayload {
            content: self.content,
            embed: self.embed.map(EmbedSource::into_embed),
            embeds: self.embeds.into_iter().map(EmbedSource::into_embed).collect(),
        };
        (payload, uploads)
    }

    /// Build the outgoing multipart form: one named part per file, then one
    /// `payload_json` part holding the serialized description. File bytes
    /// never appear inside `payload_json`.
    pub(crate) fn into_form(self) -> Result<Form> {
        let (payload, uploads) = self.normalize();
        let mut form = Form::new();
        for upload in uploads {
            let part = Part::bytes(upload.data).file_name(upload.name.clone());
            form = form.part(upload.name, part);
        }
        form = form.text("payload_json", serde_json::to_string(&payload)?);
        Ok(form)
    }
}

/// The `payload_json` part of a message upload.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}
