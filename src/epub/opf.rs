use crate::epub::{COVER_IMAGE_PROPERTY, ManifestItem, OPF_NAMESPACE};
use crate::error::Result;
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::{NsReader, Writer};

fn in_opf_namespace(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == OPF_NAMESPACE)
}

/// Build a ManifestItem from an `<item>` element's attributes
fn manifest_item(e: &BytesStart) -> Result<ManifestItem> {
    let mut item = ManifestItem::default();
    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"href" => item.href = attr.unescape_value()?.into_owned(),
            b"properties" => item.properties = Some(attr.unescape_value()?.into_owned()),
            _ => {}
        }
    }
    Ok(item)
}

/// Parse every `<item>` under the OPF `<manifest>` element, in document order.
pub fn manifest_items(xml: &str) -> Result<Vec<ManifestItem>> {
    let mut reader = NsReader::from_str(xml);
    let mut items = Vec::new();
    let mut manifest_depth = 0usize;

    loop {
        match reader.read_resolved_event()? {
            (ns, Event::Start(e)) => {
                if in_opf_namespace(&ns) {
                    match e.local_name().as_ref() {
                        b"manifest" => manifest_depth += 1,
                        b"item" if manifest_depth > 0 => items.push(manifest_item(&e)?),
                        _ => {}
                    }
                }
            }
            (ns, Event::Empty(e)) => {
                let is_item = in_opf_namespace(&ns) && e.local_name().as_ref() == b"item";
                if manifest_depth > 0 && is_item {
                    items.push(manifest_item(&e)?);
                }
            }
            (ns, Event::End(e)) => {
                if in_opf_namespace(&ns) && e.local_name().as_ref() == b"manifest" {
                    manifest_depth = manifest_depth.saturating_sub(1);
                }
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    Ok(items)
}

/// Find the first manifest item flagged with the `cover-image` property.
pub fn find_cover_item(xml: &str) -> Result<Option<ManifestItem>> {
    Ok(manifest_items(xml)?
        .into_iter()
        .find(|item| item.has_property(COVER_IMAGE_PROPERTY)))
}

/// Copy of `e` with its `href` attribute replaced; other attributes keep their order.
fn with_href(e: &BytesStart, new_href: &str) -> Result<BytesStart<'static>> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut elem = BytesStart::new(name);
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"href" {
            elem.push_attribute(("href", new_href));
        } else {
            elem.push_attribute(attr);
        }
    }
    Ok(elem)
}

fn is_cover_item(ns: &ResolveResult, e: &BytesStart, manifest_depth: usize) -> Result<bool> {
    if manifest_depth == 0 || !in_opf_namespace(ns) || e.local_name().as_ref() != b"item" {
        return Ok(false);
    }
    Ok(manifest_item(e)?.has_property(COVER_IMAGE_PROPERTY))
}

/// Rewrite the `href` of the first cover-image item to `new_href`.
///
/// Everything else in the document is streamed through unchanged, except
/// that the output always starts with a UTF-8 XML declaration. Returns
/// `None` when the manifest has no cover item.
pub fn rewrite_cover_href(xml: &str, new_href: &str) -> Result<Option<String>> {
    let mut reader = NsReader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut manifest_depth = 0usize;
    let mut rewritten = false;
    let mut first = true;

    loop {
        let (ns, event) = reader.read_resolved_event()?;

        if first {
            first = false;
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
            match event {
                Event::Decl(_) => continue,
                Event::Eof => break,
                _ => writer.write_event(Event::Text(BytesText::from_escaped("\n")))?,
            }
        }

        match event {
            Event::Start(e) => {
                if in_opf_namespace(&ns) && e.local_name().as_ref() == b"manifest" {
                    manifest_depth += 1;
                }
                if !rewritten && is_cover_item(&ns, &e, manifest_depth)? {
                    rewritten = true;
                    writer.write_event(Event::Start(with_href(&e, new_href)?))?;
                } else {
                    writer.write_event(Event::Start(e))?;
                }
            }
            Event::Empty(e) => {
                if !rewritten && is_cover_item(&ns, &e, manifest_depth)? {
                    rewritten = true;
                    writer.write_event(Event::Empty(with_href(&e, new_href)?))?;
                } else {
                    writer.write_event(Event::Empty(e))?;
                }
            }
            Event::End(e) => {
                if in_opf_namespace(&ns) && e.local_name().as_ref() == b"manifest" {
                    manifest_depth = manifest_depth.saturating_sub(1);
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    if !rewritten {
        return Ok(None);
    }

    let bytes = writer.into_inner();
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}
