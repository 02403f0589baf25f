use scraper::ElementRef;

/// Element children only, skipping text and comment nodes.
#[inline]
pub(crate) fn children(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.children().filter_map(ElementRef::wrap)
}

#[inline]
pub(crate) fn child(element: ElementRef<'_>, index: usize) -> Option<ElementRef<'_>> {
    children(element).nth(index)
}

/// Whitespace-normalized text of the element and all its descendants.
pub(crate) fn text(element: ElementRef<'_>) -> String {
    normalize(element.text())
}

/// Whitespace-normalized text of the element's direct text nodes.
pub(crate) fn own_text(element: ElementRef<'_>) -> String {
    normalize(
        element
            .children()
            .filter_map(|node| node.value().as_text().map(|text| &**text)),
    )
}

fn normalize<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let mut joined = String::new();
    for part in parts {
        joined.push_str(part);
    }

    let mut normalized = String::with_capacity(joined.len());
    for word in joined.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(word);
    }
    normalized
}

#[inline]
pub(crate) fn parent(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

#[inline]
pub(crate) fn previous_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.prev_siblings().find_map(ElementRef::wrap)
}

#[inline]
pub(crate) fn next_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// First descendant (or the element itself) carrying the id.
pub(crate) fn by_id<'a>(element: ElementRef<'a>, id: &str) -> Option<ElementRef<'a>> {
    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().id() == Some(id))
}

#[inline]
pub(crate) fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|name| name == class)
}

#[inline]
pub(crate) fn attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name)
}
