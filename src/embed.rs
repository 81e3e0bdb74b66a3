//! Fluent builder for rich message embeds.

use chrono::Utc;

use crate::error::{Error, Result};
use crate::types::{Embed, EmbedAuthor, EmbedField, EmbedFooter, EmbedImage, EmbedThumbnail};

/// Maximum length of an embed title.
pub const MAX_TITLE_LEN: usize = 256;
/// Maximum length of an embed description.
pub const MAX_DESCRIPTION_LEN: usize = 2048;
/// Maximum length of a footer text.
pub const MAX_FOOTER_LEN: usize = 2048;
/// Maximum length of an author name.
pub const MAX_AUTHOR_LEN: usize = 256;
/// Maximum length of a field name.
pub const MAX_FIELD_NAME_LEN: usize = 256;
/// Maximum length of a field value.
pub const MAX_FIELD_VALUE_LEN: usize = 1024;
/// Maximum number of fields on one embed.
pub const MAX_FIELDS: usize = 25;

/// Builds a rich embed one validated step at a time.
///
/// Every setter consumes the builder and returns a new one, so an embed
/// already attached to a message can never be mutated through a retained
/// handle. A failed setter aborts the chain with [`Error::Validation`] and
/// leaves no partial update behind.
///
/// ```
/// use minicord::EmbedBuilder;
///
/// let embed = EmbedBuilder::new()
///     .title("Release notes")?
///     .description("What changed this week")?
///     .color(0x00_99_ff)
///     .field("Fixed", "the thing", false)?
///     .build();
/// assert_eq!(embed.title.as_deref(), Some("Release notes"));
/// # Ok::<(), minicord::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmbedBuilder {
    rich: Embed,
}

impl EmbedBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the title is empty or longer than 256
    /// characters.
    pub fn title(mut self, title: impl Into<String>) -> Result<Self> {
        let title = title.into();
        require_len("embed title", &title, MAX_TITLE_LEN)?;
        self.rich.title = Some(title);
        Ok(self)
    }

    /// Set the description.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the description is empty or longer
    /// than 2048 characters.
    pub fn description(mut self, description: impl Into<String>) -> Result<Self> {
        let description = description.into();
        require_len("embed description", &description, MAX_DESCRIPTION_LEN)?;
        self.rich.description = Some(description);
        Ok(self)
    }

    /// Set the image.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the URL is empty.
    pub fn image(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        require_nonempty("image URL", &url)?;
        self.rich.image = Some(EmbedImage { url });
        Ok(self)
    }

    /// Set the thumbnail.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the URL is empty.
    pub fn thumbnail(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        require_nonempty("thumbnail URL", &url)?;
        self.rich.thumbnail = Some(EmbedThumbnail { url });
        Ok(self)
    }

    /// Set the footer.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the text is empty or longer than 2048
    /// characters, or the icon URL is empty.
    pub fn footer(mut self, text: impl Into<String>, icon_url: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let icon_url = icon_url.into();
        require_len("footer text", &text, MAX_FOOTER_LEN)?;
        require_nonempty("footer icon URL", &icon_url)?;
        self.rich.footer = Some(EmbedFooter {
            text,
            icon_url: Some(icon_url),
        });
        Ok(self)
    }

    /// Set the author.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the name is empty or longer than 256
    /// characters, or the icon URL is empty.
    pub fn author(mut self, name: impl Into<String>, icon_url: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let icon_url = icon_url.into();
        require_len("author name", &name, MAX_AUTHOR_LEN)?;
        require_nonempty("author icon URL", &icon_url)?;
        self.rich.author = Some(EmbedAuthor {
            name,
            icon_url: Some(icon_url),
        });
        Ok(self)
    }

    /// Set the accent color. Any value is accepted; absence is expressed by
    /// not calling this at all.
    #[must_use]
    pub fn color(mut self, color: u32) -> Self {
        self.rich.color = Some(color);
        self
    }

    /// Add a field. At most 25 fields fit on one embed; the 26th addition
    /// is the first rejected one.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the name is empty or longer than 256
    /// characters, the value is empty or longer than 1024 characters, or
    /// the embed already holds 25 fields.
    pub fn field(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        inline: bool,
    ) -> Result<Self> {
        let name = name.into();
        let value = value.into();
        require_len("field name", &name, MAX_FIELD_NAME_LEN)?;
        require_len("field value", &value, MAX_FIELD_VALUE_LEN)?;
        if self.rich.fields.len() >= MAX_FIELDS {
            return Err(Error::Validation(format!(
                "embed cannot hold more than {MAX_FIELDS} fields"
            )));
        }
        self.rich.fields.push(EmbedField {
            name,
            value,
            inline,
        });
        Ok(self)
    }

    /// Stamp the embed with the current instant, RFC 3339.
    #[must_use]
    pub fn timestamp(mut self) -> Self {
        self.rich.timestamp = Some(Utc::now().to_rfc3339());
        self
    }

    /// The accumulated embed.
    #[must_use]
    pub fn build(self) -> Embed {
        self.rich
    }

    /// Read access to the accumulated embed.
    #[must_use]
    pub const fn as_embed(&self) -> &Embed {
        &self.rich
    }
}

impl From<EmbedBuilder> for Embed {
    fn from(builder: EmbedBuilder) -> Self {
        builder.build()
    }
}

fn require_nonempty(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Validation(format!("{what} must not be empty")));
    }
    Ok(())
}

fn require_len(what: &str, value: &str, max: usize) -> Result<()> {
    require_nonempty(what, value)?;
    if value.chars().count() > max {
        return Err(Error::Validation(format!(
            "{what} exceeds {max} characters"
        )));
    }
    Ok(())
}
