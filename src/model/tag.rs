use serde::{Deserialize, Serialize};

/// A post tag from `GET /posts/tags`.
///
/// Older API versions return bare strings; both shapes decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTag")]
pub struct Tag {
    pub slug: String,
    pub name: String,
    pub url: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTag {
    Bare(String),
    Full {
        slug: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        url: String,
    },
}

impl From<RawTag> for Tag {
    fn from(raw: RawTag) -> Self {
        match raw {
            RawTag::Bare(slug) => Tag {
                name: slug.clone(),
                slug,
                url: String::new(),
            },
            RawTag::Full { slug, name, url } => Tag {
                name: if name.is_empty() { slug.clone() } else { name },
                slug,
                url,
            },
        }
    }
}
