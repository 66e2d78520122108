//! # tova-compile
//!
//! Code generation for the Tova compiler: the AST produced by
//! [`tova_language`] becomes runnable JavaScript on a fixed runtime API.
//!
//! One compilation produces up to five streams (see [`Output`]):
//!
//! - **shared** - top-level code outside any block
//! - **server** / **servers** - HTTP server programs with explicit routes,
//!   `POST /rpc/<fn>` endpoints, CORS, and (for named blocks) peer proxies
//!   for inter-server calls
//! - **client** - a browser module over the reactive runtime
//!   (`createSignal`, `createEffect`, `lux_el`, ...)
//! - **cli** - a `__cli_main` driver with flag parsing and generated help
//! - **deploy** - a merged configuration object, not code
//!
//! ## Quick start
//!
//! ```
//! let result = tova_compile::compile(
//!     "server { fn get_users() { [] } }",
//!     "app.tova",
//! ).unwrap();
//! let server = result.output.server.unwrap();
//! assert!(server.contains("__addRoute(\"POST\", \"/rpc/get_users\""));
//! ```

pub mod codegen;
pub mod compile;
pub mod output;

pub use compile::{compile, compile_tolerant, Compilation, CompileError, CompileResult};
pub use output::Output;
pub use codegen::generate;
