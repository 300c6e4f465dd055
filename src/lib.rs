//! A small component framework that mounts markup into a host node tree, and re-renders
//! components in place when their state changes.
//!
//! Markup is parsed by the [`Host`] and turned into a [`Skeleton`]: the tree of tags, attributes and
//! text, with `{{placeholders}}` left unresolved. Mounting creates one host node per skeleton node,
//! interpolating placeholders against an instance's state. Changing that state walks the mounted
//! nodes alongside the same skeleton, by child index, and rewrites text and attribute values in
//! place.
//!
//! ```
//! use serde_json::json;
//! use trellis::{App, ComponentDefinition, MemoryHost};
//!
//! let app = App::new(MemoryHost::new());
//! app.register(
//!     ComponentDefinition::<MemoryHost>::new("counter", || {
//!         r#"<button onclick="increment">{{count}}</button>"#.to_string()
//!     })
//!     .with_state(json!({ "count": 0 }))
//!     .with_method("increment", |ctx| {
//!         let count = ctx.get("count")?.as_i64().unwrap_or_default();
//!         ctx.set_state(json!({ "count": count + 1 }))
//!     }),
//! );
//!
//! let body = app.host().body().clone();
//! app.render("counter", "main", &body).unwrap();
//!
//! let button = app.root("counter", "main").unwrap().unwrap();
//! app.host().dispatch(&button, "click");
//! assert_eq!(app.host().inner_markup(&button), "1");
//! ```

pub mod app;
pub mod component;
mod error;
pub mod host;
pub mod interpolate;
pub mod render;
pub mod skeleton;
pub mod util;

pub use app::{App, Page, WRAPPER_TAG};
pub use component::{ComponentDefinition, Context, Hook, Hooks, InstanceId};
pub use error::{Error, Missing, Result};
pub use host::{DomHost, Host, MemoryHost, MemoryNode, NodeKind};
pub use skeleton::{Attr, Handler, Skeleton, SkeletonNode, COMPONENT_ATTRIBUTE, KEY_ATTRIBUTE};
