//! Minimal in-memory scripture document
//!
//! A host application fills this in from its own object model so the
//! [`TextAdapter`](crate::adapter::TextAdapter) can tokenize it. Only the
//! facts checks need are kept: paragraph and character styles, writing
//! systems, footnotes and picture captions, each with a stable [`ObjectId`].

use scrcheck_core::ObjectId;
use serde::{Deserialize, Serialize};

/// One book: title paragraphs, then sections in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrBook {
    pub book: u8,
    #[serde(default)]
    pub title: Vec<Paragraph>,
    #[serde(default)]
    pub sections: Vec<ScrSection>,
}

impl ScrBook {
    pub fn new(book: u8) -> Self {
        Self {
            book,
            title: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn with_title(mut self, paragraph: Paragraph) -> Self {
        self.title.push(paragraph);
        self
    }

    pub fn with_section(mut self, section: ScrSection) -> Self {
        self.sections.push(section);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScrSection {
    #[serde(default)]
    pub heading: Vec<Paragraph>,
    #[serde(default)]
    pub content: Vec<Paragraph>,
    /// Introduction material precedes chapter 1
    #[serde(default)]
    pub is_intro: bool,
}

impl ScrSection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intro() -> Self {
        Self {
            is_intro: true,
            ..Self::default()
        }
    }

    pub fn with_heading(mut self, paragraph: Paragraph) -> Self {
        self.heading.push(paragraph);
        self
    }

    pub fn with_paragraph(mut self, paragraph: Paragraph) -> Self {
        self.content.push(paragraph);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub id: ObjectId,
    pub style: String,
    #[serde(default)]
    pub writing_system: Option<String>,
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new(id: u64, style: &str) -> Self {
        Self {
            id: ObjectId(id),
            style: style.to_string(),
            writing_system: None,
            runs: Vec::new(),
        }
    }

    pub fn with_writing_system(mut self, ws: &str) -> Self {
        self.writing_system = Some(ws.to_string());
        self
    }

    /// Appends an unstyled text run.
    pub fn text(mut self, text: &str) -> Self {
        self.runs.push(Run::Text(TextRun::new(text)));
        self
    }

    /// Appends a text run in a character style.
    pub fn styled(mut self, text: &str, char_style: &str) -> Self {
        self.runs.push(Run::Text(TextRun::new(text).with_style(char_style)));
        self
    }

    pub fn run(mut self, run: TextRun) -> Self {
        self.runs.push(Run::Text(run));
        self
    }

    pub fn footnote(mut self, footnote: Footnote) -> Self {
        self.runs.push(Run::Footnote(footnote));
        self
    }

    pub fn picture(mut self, picture: Picture) -> Self {
        self.runs.push(Run::Picture(picture));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Content of a paragraph. Footnotes and pictures sit at an anchor that
/// takes one char of the paragraph's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Run {
    Text(TextRun),
    Footnote(Footnote),
    Picture(Picture),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default)]
    pub char_style: Option<String>,
    #[serde(default)]
    pub writing_system: Option<String>,
}

impl TextRun {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            char_style: None,
            writing_system: None,
        }
    }

    pub fn with_style(mut self, char_style: &str) -> Self {
        self.char_style = Some(char_style.to_string());
        self
    }

    pub fn with_writing_system(mut self, ws: &str) -> Self {
        self.writing_system = Some(ws.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footnote {
    pub paragraphs: Vec<Paragraph>,
}

impl Footnote {
    pub fn new(paragraph: Paragraph) -> Self {
        Self {
            paragraphs: vec![paragraph],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    pub id: ObjectId,
    pub caption: String,
    #[serde(default)]
    pub writing_system: Option<String>,
}

impl Picture {
    pub fn new(id: u64, caption: &str) -> Self {
        Self {
            id: ObjectId(id),
            caption: caption.to_string(),
            writing_system: None,
        }
    }
}
