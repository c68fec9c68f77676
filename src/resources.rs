//! Image resource cache.
//!
//! Implements the classic `load` / `get` / `on_ready` contract: [`load`] fires
//! asynchronous fetches for every named asset, [`get`] is a synchronous lookup,
//! and the [`on_ready`] callback runs exactly once after the last asset has
//! settled. Images that fail to load are evicted so a later `get` on them
//! fails fast instead of drawing a broken handle.

use std::cell::RefCell;
use std::collections::HashMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

struct Cache {
    images: HashMap<&'static str, HtmlImageElement>,
    pending: usize,
    ready: Option<Box<dyn FnOnce()>>,
}

thread_local! {
    static CACHE: RefCell<Cache> = RefCell::new(Cache {
        images: HashMap::new(),
        pending: 0,
        ready: None,
    });
}

/// Begin loading every asset in `names`. Fire and forget; completion is
/// observed through [`on_ready`].
pub fn load(names: &'static [&'static str]) -> Result<(), JsValue> {
    for &name in names {
        let img = HtmlImageElement::new()?;

        let onload = Closure::wrap(Box::new(move || settle(name, true)) as Box<dyn FnMut()>);
        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        let onerror = Closure::wrap(Box::new(move || settle(name, false)) as Box<dyn FnMut()>);
        img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        CACHE.with(|cache| {
            let mut cache = cache.borrow_mut();
            cache.pending += 1;
            cache.images.insert(name, img.clone());
        });

        // Setting src after registration so a cached image firing onload
        // synchronously is still counted.
        img.set_src(name);
    }
    Ok(())
}

/// Synchronous lookup. Unknown names are a hard error so a typo in a sprite
/// key surfaces immediately instead of drawing nothing.
pub fn get(name: &str) -> Result<HtmlImageElement, JsValue> {
    CACHE.with(|cache| {
        cache
            .borrow()
            .images
            .get(name)
            .cloned()
            .ok_or_else(|| JsValue::from_str(&format!("unknown resource: {name}")))
    })
}

/// Register the boot callback. Runs exactly once; immediately if every asset
/// already settled.
pub fn on_ready(callback: impl FnOnce() + 'static) {
    let fire_now = CACHE.with(|cache| {
        let cache = cache.borrow();
        cache.pending == 0 && !cache.images.is_empty()
    });
    if fire_now {
        callback();
    } else {
        CACHE.with(|cache| cache.borrow_mut().ready = Some(Box::new(callback)));
    }
}

fn settle(name: &'static str, loaded: bool) {
    let ready = CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if !loaded {
            cache.images.remove(name);
            web_sys::console::error_1(&JsValue::from_str(&format!(
                "failed to load resource: {name}"
            )));
        }
        cache.pending = cache.pending.saturating_sub(1);
        if cache.pending == 0 { cache.ready.take() } else { None }
    });
    // Run outside the borrow: the boot callback will call get().
    if let Some(callback) = ready {
        callback();
    }
}
