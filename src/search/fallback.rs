//! Ordered "A else B else default" resolution shared by every output field.

use crate::domain::RawElement;

/// First candidate that yields a value, in order
pub fn first_present<T, I>(candidates: I) -> Option<T>
where
    I: IntoIterator<Item = Option<T>>,
{
    candidates.into_iter().flatten().next()
}

/// First non-empty tag among `keys`, or `default`
pub fn tag_or<'a>(element: &'a RawElement, keys: &[&str], default: &'a str) -> &'a str {
    first_present(keys.iter().map(|key| element.tag(key))).unwrap_or(default)
}

/// `addr:full`, else "street, city" with missing parts collapsed, else ""
pub fn address(element: &RawElement) -> String {
    let composed = || {
        let street = element.tag("addr:street").unwrap_or_default();
        let city = element.tag("addr:city").unwrap_or_default();
        let joined = format!("{street}, {city}");
        let trimmed = joined.trim_matches(|c: char| c == ',' || c == ' ');
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };

    first_present([element.tag("addr:full").map(str::to_string), composed()]).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, ElementKind, Tags};

    fn element(pairs: &[(&str, &str)]) -> RawElement {
        let tags: Tags = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RawElement::new(ElementKind::Node, 1, Coordinate::new(0.0, 0.0), tags)
    }

    #[test]
    fn test_first_present() {
        assert_eq!(first_present([None, Some(2), Some(3)]), Some(2));
        assert_eq!(first_present::<i32, _>([None, None]), None);
    }

    #[test]
    fn test_tag_or_order() {
        let e = element(&[("contact:phone", "+91 80 1234"), ("phone", "+91 80 9999")]);
        assert_eq!(tag_or(&e, &["phone", "contact:phone"], "N/A"), "+91 80 9999");

        let e = element(&[("contact:phone", "+91 80 1234")]);
        assert_eq!(tag_or(&e, &["phone", "contact:phone"], "N/A"), "+91 80 1234");

        let e = element(&[("phone", "")]);
        assert_eq!(tag_or(&e, &["phone", "contact:phone"], "N/A"), "N/A");
    }

    #[test]
    fn test_address_full() {
        let e = element(&[("addr:full", "X"), ("addr:street", "A")]);
        assert_eq!(address(&e), "X");
    }

    #[test]
    fn test_address_street_city() {
        assert_eq!(address(&element(&[("addr:street", "A"), ("addr:city", "B")])), "A, B");
        assert_eq!(address(&element(&[("addr:street", "A")])), "A");
        assert_eq!(address(&element(&[("addr:city", "B")])), "B");
    }

    #[test]
    fn test_address_missing() {
        assert_eq!(address(&element(&[])), "");
        assert_eq!(address(&element(&[("addr:full", "")])), "");
    }
}
