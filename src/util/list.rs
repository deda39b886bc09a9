//! Ordered list helpers.
//!
//! Every list that ends up in generated output keeps insertion order and is
//! deduplicated on insert, so repeated runs produce identical text.

/// Append elements that are not yet present, preserving order.
pub fn append_uniquely<T: PartialEq + Clone>(list: &mut Vec<T>, elements: &[T]) {
    for element in elements {
        if !list.contains(element) {
            list.push(element.clone());
        }
    }
}

/// Prepend elements that are not yet present.
///
/// Elements are inserted one at a time at the front, so the last element of
/// `elements` ends up first.
pub fn prepend_uniquely<T: PartialEq + Clone>(list: &mut Vec<T>, elements: &[T]) {
    for element in elements {
        if !list.contains(element) {
            list.insert(0, element.clone());
        }
    }
}

/// Elements of `second` that also appear in `first`, in `second`'s order.
pub fn intersection<T: PartialEq + Clone>(first: &[T], second: &[T]) -> Vec<T> {
    let mut result = Vec::new();
    for element in second {
        if first.contains(element) && !result.contains(element) {
            result.push(element.clone());
        }
    }
    result
}

/// Remove every occurrence of the given elements.
pub fn remove_all<T: PartialEq>(list: &mut Vec<T>, elements: &[T]) {
    list.retain(|item| !elements.contains(item));
}

/// Last string in `list` containing `needle`.
pub fn find_last<'a>(list: &'a [String], needle: &str) -> Option<&'a str> {
    list.iter().rev().find(|s| s.contains(needle)).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_append_uniquely() {
        let mut list = strings(&["one", "two"]);
        append_uniquely(&mut list, &strings(&["three", "one"]));
        assert_eq!(list, strings(&["one", "two", "three"]));
    }

    #[test]
    fn test_prepend_uniquely() {
        let mut list = strings(&["one", "two"]);
        prepend_uniquely(&mut list, &strings(&["three"]));
        assert_eq!(list, strings(&["three", "one", "two"]));

        prepend_uniquely(&mut list, &strings(&["one"]));
        assert_eq!(list, strings(&["three", "one", "two"]));
    }

    #[test]
    fn test_intersection() {
        assert_eq!(
            intersection(&strings(&["one", "two"]), &strings(&["two", "three"])),
            strings(&["two"])
        );
        assert!(intersection(&strings(&["one"]), &strings(&["three"])).is_empty());
    }

    #[test]
    fn test_remove_all() {
        let mut list = strings(&["one", "two", "three"]);
        remove_all(&mut list, &strings(&["two", "four"]));
        assert_eq!(list, strings(&["one", "three"]));
    }

    #[test]
    fn test_find_last() {
        let list = strings(&["option one", "option two", "other"]);
        assert_eq!(find_last(&list, "option"), Some("option two"));
        assert_eq!(find_last(&list, "missing"), None);
    }
}
