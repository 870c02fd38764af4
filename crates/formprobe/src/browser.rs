//! Browser control over the Chrome DevTools Protocol.
//!
//! With the `browser` feature, [`Browser`] launches Chromium through
//! chromiumoxide and [`CdpDriver`] implements [`DomDriver`] against a live
//! page. Element handles live in a page-side registry (`window.__formprobe`);
//! a handle whose element left the document fails with a stale-node error.
//!
//! Pointer presses are real `Input.dispatchMouseEvent` presses at the
//! element's geometry, and text entry uses `Input.insertText`, so the
//! application receives the same trusted events a user would produce.

use serde::{Deserialize, Serialize};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Window width
    pub viewport_width: u32,
    /// Window height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 900,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Page-side scripts
// ============================================================================

/// Installs the node registry and helpers once per document
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const PRELUDE: &str = r"
if (!window.__formprobe) {
  const nodes = [];
  const ids = new WeakMap();
  const fp = {
    id(el) {
      if (!el) return null;
      let id = ids.get(el);
      if (id === undefined) { id = nodes.length; nodes.push(el); ids.set(el, id); }
      return id;
    },
    get(id) {
      const el = nodes[id];
      if (!el || !el.isConnected) throw new Error('stale node #' + id);
      return el;
    },
    scope(id) { return id === null ? document.body : fp.get(id); },
    norm(t) { return (t || '').replace(/\s+/g, ' ').trim(); },
    visible(el) {
      if (el.tagName === 'INPUT' && el.type === 'hidden') return false;
      const s = getComputedStyle(el);
      if (s.display === 'none' || s.visibility === 'hidden') return false;
      const r = el.getBoundingClientRect();
      return r.width > 0 && r.height > 0;
    },
    describe(el) {
      const attributes = {};
      for (const a of el.attributes) attributes[a.name] = a.value;
      return {
        node: fp.id(el),
        tag: el.tagName.toLowerCase(),
        attributes,
        text: fp.norm(el.textContent),
        value: typeof el.value === 'string' ? el.value : '',
        checked: el.checked === true,
        visible: fp.visible(el),
      };
    },
    nativeSetter(el) {
      const proto = el instanceof HTMLSelectElement ? HTMLSelectElement.prototype
        : el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype
        : HTMLInputElement.prototype;
      return Object.getOwnPropertyDescriptor(proto, 'value').set;
    },
  };
  window.__formprobe = fp;
}
";

/// Input types that do not accept typed characters
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const PICKER_INPUT_TYPES: &[&str] = &["date", "datetime-local", "month", "time", "week", "color"];

#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::significant_drop_tightening)]
mod cdp {
    use super::{BrowserConfig, PICKER_INPUT_TYPES, PRELUDE};
    use crate::driver::{
        ClickOptions, ClickPosition, DomDriver, ElementQuery, NodeInfo, NodeRef, Point,
        SyntheticEvent, TextMatch,
    };
    use crate::result::{ProbeError, ProbeResult};
    use crate::wait::{wait_until, WaitOptions};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::input::{
        DispatchMouseEventParams, DispatchMouseEventType, InsertTextParams, MouseButton,
    };
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use serde::Deserialize;

    /// Browser instance with a live CDP connection
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        inner: CdpBrowser,
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch Chromium
        pub async fn launch(config: BrowserConfig) -> ProbeResult<Self> {
            let mut builder = CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);
            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }
            let cdp_config = builder
                .build()
                .map_err(|message| ProbeError::BrowserLaunch { message })?;

            let (browser, mut handler) =
                CdpBrowser::launch(cdp_config)
                    .await
                    .map_err(|e| ProbeError::BrowserLaunch {
                        message: e.to_string(),
                    })?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });
            tracing::info!(headless = config.headless, "browser launched");

            Ok(Self {
                config,
                inner: browser,
                handle,
            })
        }

        /// Open `url` in a new page
        pub async fn open(&self, url: &str) -> ProbeResult<CdpDriver> {
            let page = self
                .inner
                .new_page(url)
                .await
                .map_err(|e| ProbeError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            tracing::info!(url, "page opened");
            Ok(CdpDriver {
                page,
                url: url.to_string(),
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser; the CDP handler task stops even when closing fails
        pub async fn close(mut self) -> ProbeResult<()> {
            let closed = self.inner.close().await;
            release_handler(closed, &self.handle)
        }
    }

    /// Where a pointer press would land
    #[derive(Debug, Deserialize)]
    struct PressTarget {
        x: f64,
        y: f64,
        visible: bool,
        hit: bool,
    }

    /// [`DomDriver`] over one Chromium page
    #[derive(Debug)]
    pub struct CdpDriver {
        page: CdpPage,
        url: String,
    }

    impl CdpDriver {
        /// URL the page was opened at
        #[must_use]
        pub fn url(&self) -> &str {
            &self.url
        }

        /// Wait until an element matching `css` is present
        pub async fn wait_for(&self, css: &str, options: &WaitOptions) -> ProbeResult<()> {
            let script = format!("document.querySelector({}) !== null", js(css));
            wait_until(options, &format!("element '{css}'"), || self.eval::<bool>(&script)).await
        }

        async fn eval<T: DeserializeOwned>(&self, body: &str) -> ProbeResult<T> {
            let expression = format!("(() => {{ {PRELUDE}\nconst fp = window.__formprobe;\n{body}\n}})()");
            let result = self
                .page
                .evaluate(expression)
                .await
                .map_err(|e| ProbeError::driver(e.to_string()))?;
            result
                .into_value()
                .map_err(|e| ProbeError::driver(format!("unexpected page result: {e}")))
        }

        async fn node_op(&self, node: NodeRef, body: &str) -> ProbeResult<()> {
            self.eval::<bool>(&format!("const el = fp.get({});\n{body}\nreturn true;", node.0))
                .await
                .map(|_| ())
        }

        async fn press(&self, point: Point) -> ProbeResult<()> {
            for kind in [
                DispatchMouseEventType::MouseMoved,
                DispatchMouseEventType::MousePressed,
                DispatchMouseEventType::MouseReleased,
            ] {
                let params = DispatchMouseEventParams::builder()
                    .r#type(kind)
                    .x(point.x)
                    .y(point.y)
                    .button(MouseButton::Left)
                    .click_count(1)
                    .build()
                    .map_err(ProbeError::driver)?;
                self.page
                    .execute(params)
                    .await
                    .map_err(|e| ProbeError::driver(e.to_string()))?;
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DomDriver for CdpDriver {
        async fn find_by_text(
            &self,
            scope: Option<NodeRef>,
            text: &str,
            mode: TextMatch,
        ) -> ProbeResult<Vec<NodeRef>> {
            let exact = matches!(mode, TextMatch::Exact);
            let script = format!(
                "const root = fp.scope({scope});
const needle = fp.norm({needle});
const test = (el) => {{
  const t = fp.norm(el.textContent);
  return {exact} ? t === needle : (needle !== '' && t.includes(needle));
}};
return Array.from(root.querySelectorAll('*'))
  .filter((el) => el.tagName !== 'SCRIPT' && el.tagName !== 'STYLE' && test(el))
  .filter((el) => !Array.from(el.children).some(test))
  .map(fp.id);",
                scope = js_node(scope),
                needle = js(text),
            );
            Ok(self.eval::<Vec<u64>>(&script).await?.into_iter().map(NodeRef).collect())
        }

        async fn query_all(
            &self,
            scope: Option<NodeRef>,
            query: &ElementQuery,
        ) -> ProbeResult<Vec<NodeRef>> {
            let script = format!(
                "return Array.from(fp.scope({}).querySelectorAll({}))
  .filter((el) => !{} || fp.visible(el))
  .map(fp.id);",
                js_node(scope),
                js(&query.to_css()),
                query.visible_only,
            );
            Ok(self.eval::<Vec<u64>>(&script).await?.into_iter().map(NodeRef).collect())
        }

        async fn describe(&self, node: NodeRef) -> ProbeResult<NodeInfo> {
            self.eval(&format!("return fp.describe(fp.get({}));", node.0))
                .await
        }

        async fn parent(&self, node: NodeRef) -> ProbeResult<Option<NodeRef>> {
            let script = format!(
                "const el = fp.get({});
return el === document.body ? null : fp.id(el.parentElement);",
                node.0
            );
            Ok(self.eval::<Option<u64>>(&script).await?.map(NodeRef))
        }

        async fn next_sibling(&self, node: NodeRef) -> ProbeResult<Option<NodeRef>> {
            let script = format!("return fp.id(fp.get({}).nextElementSibling);", node.0);
            Ok(self.eval::<Option<u64>>(&script).await?.map(NodeRef))
        }

        async fn previous_sibling(&self, node: NodeRef) -> ProbeResult<Option<NodeRef>> {
            let script = format!("return fp.id(fp.get({}).previousElementSibling);", node.0);
            Ok(self.eval::<Option<u64>>(&script).await?.map(NodeRef))
        }

        async fn click(&self, node: NodeRef, options: ClickOptions) -> ProbeResult<()> {
            let (fx, fy, dx, dy) = match options.position {
                ClickPosition::Center => (0.5, 0.5, 0.0, 0.0),
                ClickPosition::TopLeft => (0.0, 0.0, 1.0, 1.0),
            };
            let script = format!(
                "const el = fp.get({});
el.scrollIntoView({{ block: 'center', inline: 'center' }});
const r = el.getBoundingClientRect();
const x = r.left + r.width * {fx} + {dx};
const y = r.top + r.height * {fy} + {dy};
const top = document.elementFromPoint(x, y);
return {{ x, y, visible: fp.visible(el), hit: top !== null && (top === el || el.contains(top)) }};",
                node.0
            );
            let target: PressTarget = self.eval(&script).await?;
            if target.hit {
                return self.press(Point::new(target.x, target.y)).await;
            }
            if !options.force {
                return Err(ProbeError::NotActionable {
                    reason: if target.visible {
                        format!("{node} is covered by another element")
                    } else {
                        format!("{node} is not visible")
                    },
                });
            }
            tracing::debug!(%node, "forced press dispatched to element");
            self.node_op(
                node,
                &format!(
                    "const init = {{ bubbles: true, cancelable: true, composed: true, clientX: {x}, clientY: {y}, button: 0 }};
for (const type of ['pointerdown', 'mousedown', 'pointerup', 'mouseup']) {{
  const Ctor = type.startsWith('pointer') ? PointerEvent : MouseEvent;
  el.dispatchEvent(new Ctor(type, init));
}}
el.dispatchEvent(new MouseEvent('click', init));",
                    x = target.x,
                    y = target.y,
                ),
            )
            .await
        }

        async fn click_at(&self, point: Point) -> ProbeResult<()> {
            self.press(point).await
        }

        async fn type_text(&self, node: NodeRef, text: &str) -> ProbeResult<()> {
            let info = self.describe(node).await?;
            if !info.is_text_entry() {
                return Err(ProbeError::driver(format!("{node} <{}> does not accept text", info.tag)));
            }
            if info.input_type().is_some_and(|t| PICKER_INPUT_TYPES.contains(&t)) {
                return self
                    .node_op(
                        node,
                        &format!(
                            "el.focus();
fp.nativeSetter(el).call(el, {});
el.dispatchEvent(new Event('input', {{ bubbles: true }}));
el.dispatchEvent(new Event('change', {{ bubbles: true }}));",
                            js(text)
                        ),
                    )
                    .await;
            }
            self.node_op(
                node,
                "el.focus();
if (typeof el.setSelectionRange === 'function') {
  try { el.setSelectionRange(el.value.length, el.value.length); } catch (_) {}
}",
            )
            .await?;
            self.page
                .execute(InsertTextParams::new(text))
                .await
                .map_err(|e| ProbeError::driver(e.to_string()))?;
            Ok(())
        }

        async fn clear_text(&self, node: NodeRef) -> ProbeResult<()> {
            self.node_op(
                node,
                "el.focus();
if (el.value !== '') {
  fp.nativeSetter(el).call(el, '');
  el.dispatchEvent(new Event('input', { bubbles: true }));
}",
            )
            .await
        }

        async fn native_set_value(&self, node: NodeRef, value: &str) -> ProbeResult<()> {
            self.node_op(node, &format!("fp.nativeSetter(el).call(el, {});", js(value)))
                .await
        }

        async fn dispatch_event(&self, node: NodeRef, event: SyntheticEvent) -> ProbeResult<()> {
            self.node_op(
                node,
                &format!(
                    "el.dispatchEvent(new Event({}, {{ bubbles: {} }}));",
                    js(event.kind.as_str()),
                    event.bubbles
                ),
            )
            .await
        }
    }

    /// JavaScript string literal
    fn js(value: &str) -> String {
        serde_json::Value::String(value.to_string()).to_string()
    }

    /// Stop the handler task, then report how closing went
    fn release_handler<T, E: std::fmt::Display>(
        closed: Result<T, E>,
        handle: &tokio::task::JoinHandle<()>,
    ) -> ProbeResult<()> {
        handle.abort();
        closed.map(|_| ()).map_err(|e| ProbeError::driver(format!("browser close failed: {e}")))
    }

    fn js_node(node: Option<NodeRef>) -> String {
        node.map_or_else(|| "null".to_string(), |n| n.0.to_string())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_js_literal_escapes() {
            assert_eq!(js("it's \"quoted\""), r#""it's \"quoted\"""#);
            assert_eq!(js_node(None), "null");
            assert_eq!(js_node(Some(NodeRef(7))), "7");
        }

        #[tokio::test]
        async fn test_failed_close_still_stops_handler() {
            let handle = tokio::spawn(futures::future::pending::<()>());
            let err = release_handler::<(), _>(Err("connection reset"), &handle).unwrap_err();
            assert!(err.to_string().contains("connection reset"));
            let joined = handle.await.unwrap_err();
            assert!(joined.is_cancelled());
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{Browser, CdpDriver};
