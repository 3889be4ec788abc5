use std::cell::RefCell;
use std::rc::Rc;

use lol_html::{RewriteStrSettings, element, rewrite_str};

use crate::application::site::AdapterFailure;
use crate::util::html::decode_entities;

/// Value of the first hidden `form_key` input on the page.
pub fn form_key(html: &str) -> Result<String, AdapterFailure> {
    let found: Rc<RefCell<Option<String>>> = Rc::default();

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("input[name=\"form_key\"]", {
                let found = Rc::clone(&found);
                move |el| {
                    let mut found = found.borrow_mut();
                    if found.is_none()
                        && let Some(value) = el.get_attribute("value")
                        && !value.trim().is_empty()
                    {
                        *found = Some(decode_entities(value.trim()));
                    }
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| AdapterFailure::Markup(err.to_string()))?;

    let value = found.borrow_mut().take();
    value.ok_or(AdapterFailure::MissingElement("form key"))
}
