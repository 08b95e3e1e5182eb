use serde::de::DeserializeOwned;
use serde::Deserialize;

/// A Stepik REST resource. Responses wrap records in an envelope keyed by
/// the resource path, e.g. `{"courses": [...]}`.
pub trait ApiEntity: DeserializeOwned {
    const PATH: &'static str;
    const NAME: &'static str;
}

#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub id: i64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub first_lesson: Option<i64>,
    #[serde(default)]
    pub first_unit: Option<i64>,
    #[serde(default)]
    pub sections: Vec<i64>,
}

impl ApiEntity for Course {
    const PATH: &'static str = "courses";
    const NAME: &'static str = "course";
}

impl Course {
    pub fn url(&self) -> String {
        format!("https://stepik.org/course/{}", self.id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub id: i64,
    pub position: i64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub units: Vec<i64>,
}

impl ApiEntity for Section {
    const PATH: &'static str = "sections";
    const NAME: &'static str = "section";
}

/// `stepics/1` describes the session the token belongs to
#[derive(Debug, Clone, Deserialize)]
pub struct Stepic {
    pub user: i64,
}

impl ApiEntity for Stepic {
    const PATH: &'static str = "stepics";
    const NAME: &'static str = "stepic";
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_ignores_unknown_fields() {
        let json = r#"{
            "id": 1,
            "slug": "Epic-Guide-to-Stepik-1",
            "title": "Epic Guide to Stepik",
            "first_lesson": 8,
            "first_unit": 9,
            "sections": [1, 2],
            "summary": "not modelled"
        }"#;

        let course: Course = serde_json::from_str(json).unwrap();

        assert_eq!(course.id, 1);
        assert_eq!(course.slug, "Epic-Guide-to-Stepik-1");
        assert_eq!(course.sections, vec![1, 2]);
        assert_eq!(course.url(), "https://stepik.org/course/1");
    }

    #[test]
    fn test_course_optional_fields() {
        let json = r#"{"id": 2, "slug": "s", "title": "t", "first_lesson": null}"#;
        let course: Course = serde_json::from_str(json).unwrap();

        assert_eq!(course.first_lesson, None);
        assert_eq!(course.first_unit, None);
        assert!(course.sections.is_empty());
    }

    #[test]
    fn test_section() {
        let json = r#"{
            "id": 1,
            "position": 1,
            "slug": "Basics-1",
            "title": "Basics",
            "description": "",
            "units": [1, 2, 3]
        }"#;

        let section: Section = serde_json::from_str(json).unwrap();

        assert_eq!(section.slug, "Basics-1");
        assert_eq!(section.units.len(), 3);
    }
}
