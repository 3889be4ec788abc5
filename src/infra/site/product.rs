//! Product page extraction.

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::{RewriteStrSettings, element, rewrite_str, text};

use crate::application::site::AdapterFailure;
use crate::domain::comics::{self, ComicInfo};
use crate::util::html::clean_text;

const PRICE_SELECTOR: &str = "span.price";
const PRICE_FALLBACK_SELECTOR: &str = "[class*=\"price\"]";

/// Title candidates in order of preference.
const TITLE_SELECTORS: [&str; 6] = [
    "h1.page-title span",
    "span.base[data-ui-id=\"page-title-wrapper\"]",
    "h1.product-name",
    ".product-name",
    ".product-title",
    ".item-title",
];

const ROW_SELECTOR: &str = ".additional-attributes-wrapper ul.items li";
const ROW_FALLBACK_SELECTOR: &str = ".product-info-main ul.items li";

#[derive(Default)]
struct AttributeRow {
    label: String,
    value: String,
}

type Captures = Rc<RefCell<Vec<String>>>;
type Rows = Rc<RefCell<Vec<AttributeRow>>>;

/// Extract a [`ComicInfo`] from a product page fetched from `url`.
///
/// Missing price or title fall back to placeholders; attribute rows are
/// taken from the first container that has any.
pub fn parse_product(html: &str, url: &str) -> Result<ComicInfo, AdapterFailure> {
    let price: Captures = Rc::default();
    let price_fallback: Captures = Rc::default();
    let titles: Vec<Captures> = TITLE_SELECTORS.iter().map(|_| Rc::default()).collect();
    let rows: Rows = Rc::default();
    let fallback_rows: Rows = Rc::default();

    let mut handlers = Vec::new();
    for (selector, captures) in [(PRICE_SELECTOR, &price), (PRICE_FALLBACK_SELECTOR, &price_fallback)]
        .into_iter()
        .chain(TITLE_SELECTORS.into_iter().zip(titles.iter()))
    {
        let opened = Rc::clone(captures);
        handlers.push(element!(selector, move |_el| {
            opened.borrow_mut().push(String::new());
            Ok(())
        }));
        let sink = Rc::clone(captures);
        handlers.push(text!(selector, move |chunk| {
            if let Some(current) = sink.borrow_mut().last_mut() {
                current.push_str(chunk.as_str());
            }
            Ok(())
        }));
    }

    for (container, rows) in [(ROW_SELECTOR, &rows), (ROW_FALLBACK_SELECTOR, &fallback_rows)] {
        let opened = Rc::clone(rows);
        handlers.push(element!(container, move |_el| {
            opened.borrow_mut().push(AttributeRow::default());
            Ok(())
        }));
        let labels = Rc::clone(rows);
        let label_selector = format!("{container} strong.label");
        handlers.push(text!(&label_selector, move |chunk| {
            if let Some(row) = labels.borrow_mut().last_mut() {
                row.label.push_str(chunk.as_str());
            }
            Ok(())
        }));
        let values = Rc::clone(rows);
        let value_selector = format!("{container} span.data");
        handlers.push(text!(&value_selector, move |chunk| {
            if let Some(row) = values.borrow_mut().last_mut() {
                row.value.push_str(chunk.as_str());
            }
            Ok(())
        }));
    }

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| AdapterFailure::Markup(err.to_string()))?;

    let price = first_non_empty(&price)
        .or_else(|| first_non_empty(&price_fallback))
        .unwrap_or_else(|| comics::PRICE_UNAVAILABLE.to_string());
    let mut info = ComicInfo::new(price, url);

    let title = titles.iter().find_map(first_non_empty);
    let (title, name) = match title {
        Some(title) => (title.clone(), title),
        None => (
            comics::UNKNOWN_TITLE.to_string(),
            comics::UNKNOWN_NAME.to_string(),
        ),
    };
    insert(&mut info, comics::TITLE, title)?;
    insert(&mut info, comics::NAME, name)?;

    let rows = if rows.borrow().is_empty() {
        fallback_rows
    } else {
        rows
    };
    for row in rows.borrow().iter() {
        let label = clean_text(&row.label);
        let label = label.trim_matches(':').trim();
        if label.is_empty() || label == comics::PRICE || label == comics::URL {
            continue;
        }
        insert(&mut info, label, clean_text(&row.value))?;
    }

    Ok(info)
}

fn first_non_empty(captures: &Captures) -> Option<String> {
    captures
        .borrow()
        .iter()
        .map(|raw| clean_text(raw))
        .find(|text| !text.is_empty())
}

fn insert(info: &mut ComicInfo, name: &str, value: String) -> Result<(), AdapterFailure> {
    info.insert(name, value)
        .map_err(|err| AdapterFailure::Markup(err.to_string()))
}
