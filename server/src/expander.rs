use std::path::Path;

use expando_msg::ResponseError;
use expando_parse::{ParseOptions, parse_str_with};
use expando_tree::Subtree;
use tracing::error;

use crate::ProcMacroServer;

/// Expands macro calls given as source text.
pub struct Expander {
    server: ProcMacroServer,
    options: ParseOptions,
}

impl Expander {
    pub fn new(server: ProcMacroServer, options: ParseOptions) -> Self {
        Self { server, options }
    }

    pub fn into_server(self) -> ProcMacroServer {
        self.server
    }

    /// Builds a token tree from `body` and expands it with macro `name`
    /// from library `lib`.
    ///
    /// Transport failures are logged and give `None`; an error reported by
    /// the server is the inner `Err`.
    pub async fn expand_source(
        &self,
        body: &str,
        name: &str,
        lib: &Path,
    ) -> Option<Result<Subtree, ResponseError>> {
        self.expand_source_with_attributes(body, None, name, lib)
            .await
    }

    /// Like [`Expander::expand_source`], also passing attribute macro
    /// arguments given as source text.
    pub async fn expand_source_with_attributes(
        &self,
        body: &str,
        attributes: Option<&str>,
        name: &str,
        lib: &Path,
    ) -> Option<Result<Subtree, ResponseError>> {
        let macro_body = parse_str_with(body, self.options);
        let attributes = attributes.map(|text| parse_str_with(text, self.options));
        match self.server.expand(macro_body, name, attributes, lib).await {
            Ok(result) => Some(result),
            Err(error) => {
                error!(macro_name = name, lib = %lib.display(), ?error, "Macro expansion failed");
                None
            }
        }
    }
}
