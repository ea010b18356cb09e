//! Browser `fetch` with a timeout.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, RequestInit, Response};

use crate::error::CatalogLoadError;

/// GET `url` and return the body as text.
///
/// The request is aborted after `timeout_ms`; non-2xx answers are errors.
pub async fn fetch_text(url: &str, timeout_ms: u32) -> Result<String, CatalogLoadError> {
    let window = web_sys::window().ok_or_else(|| CatalogLoadError::Fetch("no window".into()))?;
    let controller = AbortController::new().map_err(describe)?;

    let init = RequestInit::new();
    init.set_method("GET");
    init.set_signal(Some(&controller.signal()));

    let timed_out = Rc::new(Cell::new(false));
    let on_timeout = {
        let timed_out = timed_out.clone();
        Closure::<dyn FnMut()>::new(move || {
            timed_out.set(true);
            controller.abort();
        })
    };
    let timer = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            on_timeout.as_ref().unchecked_ref(),
            timeout_ms.min(i32::MAX as u32) as i32,
        )
        .map_err(describe)?;

    // The timer stays armed until the body has been read as well.
    let outcome: Result<Result<JsValue, CatalogLoadError>, JsValue> = async {
        let value = JsFuture::from(window.fetch_with_str_and_init(url, &init)).await?;
        let response: Response = value.dyn_into()?;
        if !response.ok() {
            return Ok(Err(CatalogLoadError::Status(response.status())));
        }
        let body = JsFuture::from(response.text()?).await?;
        Ok::<_, JsValue>(Ok(body))
    }
    .await;
    window.clear_timeout_with_handle(timer);
    drop(on_timeout);

    let body = match settle(outcome, timed_out.get(), timeout_ms)? {
        Ok(body) => body,
        Err(status) => return Err(status),
    };
    body.as_string()
        .ok_or_else(|| CatalogLoadError::Fetch("response body is not text".into()))
}

/// Classify the outcome of the request. Any JS failure after the timer fired
/// is the abort it triggered, whether it hit the headers or the body.
fn settle<T>(
    outcome: Result<Result<T, CatalogLoadError>, JsValue>,
    timed_out: bool,
    timeout_ms: u32,
) -> Result<Result<T, CatalogLoadError>, CatalogLoadError> {
    match outcome {
        Ok(result) => Ok(result),
        Err(_) if timed_out => Err(CatalogLoadError::TimedOut(timeout_ms)),
        Err(err) => Err(describe(err)),
    }
}

fn describe(err: JsValue) -> CatalogLoadError {
    let text = err
        .as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"));
    CatalogLoadError::Fetch(text)
}
