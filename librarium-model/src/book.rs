use serde::{Deserialize, Serialize};

use crate::ids::{AuthorId, BookId, PublisherId};

/// A catalogued book together with its relation ID lists.
///
/// `author_ids` is never empty for a persisted book; `translator_ids` may
/// be. Both join sets live in separate relations over the same author
/// table, so the same person can appear in either role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub pkid: BookId,
    pub title: String,
    pub isbn: String,
    pub price: f64,
    pub edition: String,
    pub printing: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,

    pub author_ids: Vec<AuthorId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub translator_ids: Vec<AuthorId>,
    pub publisher_id: PublisherId,
}

/// Key + name pair for a related author or translator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub pkid: AuthorId,
    pub name: String,
}

/// Key + name pair for the related publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherSummary {
    pub pkid: PublisherId,
    pub name: String,
}

/// A book with denormalized summaries of its related entities attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,

    pub authors: Vec<AuthorSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub translators: Vec<AuthorSummary>,
    pub publisher: PublisherSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Book {
        Book {
            pkid: BookId::new(1),
            title: "Sample Title".into(),
            isbn: "123-456".into(),
            price: 19.99,
            edition: "1st".into(),
            printing: "2025-06".into(),
            image_url: "http://example.com/cover.jpg".into(),
            remark: None,
            author_ids: vec![AuthorId::new(10), AuthorId::new(11)],
            translator_ids: vec![],
            publisher_id: PublisherId::new(5),
        }
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["imageUrl"], "http://example.com/cover.jpg");
        assert_eq!(json["authorIds"], serde_json::json!([10, 11]));
        assert_eq!(json["publisherId"], 5);
    }

    #[test]
    fn empty_translator_set_is_absent_on_the_wire() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("translatorIds").is_none());
        assert!(json.get("remark").is_none());
    }

    #[test]
    fn missing_translator_ids_deserialize_as_empty() {
        let book: Book = serde_json::from_str(
            r#"{
                "pkid": 2,
                "title": "T",
                "isbn": "X1",
                "price": 10.0,
                "edition": "1st",
                "printing": "2024-01",
                "imageUrl": "http://example.com/x.jpg",
                "authorIds": [7],
                "publisherId": 1
            }"#,
        )
        .unwrap();
        assert!(book.translator_ids.is_empty());
        assert_eq!(book.author_ids, vec![AuthorId::new(7)]);
    }
}
