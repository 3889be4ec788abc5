//! Parser for the retailer's "wishlist shared" email body.

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::{RewriteStrSettings, element, rewrite_str, text};
use thiserror::Error;

use crate::domain::wishlist::{Wishlist, WishlistItem};
use crate::util::html::{clean_text, decode_entities};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    #[error("notification markup could not be read: {0}")]
    Markup(String),
    #[error("notification has no share message")]
    MissingMessage,
}

#[derive(Default)]
struct MessageState {
    cells: Vec<String>,
    heading: String,
    heading_cell: Option<usize>,
}

#[derive(Default)]
struct ItemState {
    paragraphs: usize,
    name: String,
    link: Option<String>,
    image: Option<String>,
}

/// Extract the share message and listed products from a notification body.
pub fn parse_notification(html: &str) -> Result<Wishlist, NotificationError> {
    let message = Rc::new(RefCell::new(MessageState::default()));
    let items: Rc<RefCell<Vec<ItemState>>> = Rc::default();

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("table.message-info td", {
                    let message = Rc::clone(&message);
                    move |_el| {
                        message.borrow_mut().cells.push(String::new());
                        Ok(())
                    }
                }),
                text!("table.message-info td", {
                    let message = Rc::clone(&message);
                    move |chunk| {
                        if let Some(cell) = message.borrow_mut().cells.last_mut() {
                            cell.push_str(chunk.as_str());
                        }
                        Ok(())
                    }
                }),
                element!("table.message-info h3", {
                    let message = Rc::clone(&message);
                    move |_el| {
                        let mut state = message.borrow_mut();
                        if state.heading_cell.is_none() {
                            state.heading_cell = state.cells.len().checked_sub(1);
                        }
                        Ok(())
                    }
                }),
                text!("table.message-info h3", {
                    let message = Rc::clone(&message);
                    move |chunk| {
                        let mut state = message.borrow_mut();
                        let current = state.cells.len().checked_sub(1);
                        if current == state.heading_cell {
                            state.heading.push_str(chunk.as_str());
                        }
                        Ok(())
                    }
                }),
                element!("td.col.product", {
                    let items = Rc::clone(&items);
                    move |_el| {
                        items.borrow_mut().push(ItemState::default());
                        Ok(())
                    }
                }),
                element!("td.col.product p", {
                    let items = Rc::clone(&items);
                    move |_el| {
                        if let Some(item) = items.borrow_mut().last_mut() {
                            item.paragraphs += 1;
                        }
                        Ok(())
                    }
                }),
                text!("td.col.product p strong", {
                    let items = Rc::clone(&items);
                    move |chunk| {
                        if let Some(item) = items.borrow_mut().last_mut()
                            && item.paragraphs == 2
                        {
                            item.name.push_str(chunk.as_str());
                        }
                        Ok(())
                    }
                }),
                element!("td.col.product p a[href]", {
                    let items = Rc::clone(&items);
                    move |el| {
                        if let Some(item) = items.borrow_mut().last_mut()
                            && item.paragraphs == 2
                            && item.link.is_none()
                        {
                            item.link = el.get_attribute("href");
                        }
                        Ok(())
                    }
                }),
                element!("td.col.product img.product-image-photo", {
                    let items = Rc::clone(&items);
                    move |el| {
                        if let Some(item) = items.borrow_mut().last_mut()
                            && item.image.is_none()
                        {
                            item.image = el
                                .get_attribute("data-src")
                                .filter(|value| !value.trim().is_empty())
                                .or_else(|| el.get_attribute("src"));
                        }
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| NotificationError::Markup(err.to_string()))?;

    let state = message.borrow();
    let cell = state
        .heading_cell
        .and_then(|index| state.cells.get(index))
        .ok_or(NotificationError::MissingMessage)?;
    let cell_text = clean_text(cell);
    let heading = clean_text(&state.heading);
    let text = cell_text.replacen(&heading, "", 1).trim().to_string();

    let items = items
        .borrow()
        .iter()
        .map(|item| WishlistItem {
            name: clean_text(&item.name),
            link: item
                .link
                .as_deref()
                .map(|link| decode_entities(link.trim()))
                .unwrap_or_default(),
            image: item
                .image
                .as_deref()
                .map(|image| repair_image_url(&decode_entities(image)))
                .unwrap_or_default(),
        })
        .collect();

    Ok(Wishlist {
        message: text,
        items,
    })
}

/// Undo the mangling the mail pipeline applies to image URLs and point them
/// at the original instead of the resized cache copy.
pub fn repair_image_url(raw: &str) -> String {
    let repaired = raw
        .trim()
        .replace("produc=t", "product")
        .replace("collection-=", "collection-");

    match repaired.split_once("/cache/") {
        Some((prefix, rest)) => match rest.split_once('/') {
            Some((_hash, path)) => format!("{prefix}/{path}"),
            None => prefix.to_string(),
        },
        None => repaired,
    }
}
