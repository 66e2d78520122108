use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use tova_language::analysis::SymbolKind as TovaSymbolKind;
use tova_language::session::{collect_symbols, find_symbol_at_position, symbol_detail};

use crate::document::{span_range, word_at};
use crate::state::ServerState;

pub struct TovaServer {
    client: Client,
    state: ServerState,
}

impl TovaServer {
    pub fn new(client: Client) -> Self {
        TovaServer {
            client,
            state: ServerState::new(),
        }
    }

    async fn publish_diagnostics(&self, uri: Url) {
        if let Some(doc) = self.state.documents.get(&uri) {
            self.client
                .publish_diagnostics(uri.clone(), doc.diagnostics.clone(), Some(doc.version))
                .await;
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for TovaServer {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "tova-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        log::info!("Tova LSP initialized");
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri.clone();
        self.state.open_document(
            params.text_document.uri,
            params.text_document.text,
            params.text_document.version,
        );
        self.publish_diagnostics(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.clone();
        // FULL sync: exactly one change carrying the whole text.
        if let Some(change) = params.content_changes.into_iter().next() {
            self.state
                .update_document(&uri, change.text, params.text_document.version);
        }
        self.publish_diagnostics(uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.state.close_document(&params.text_document.uri);
        self.client
            .publish_diagnostics(params.text_document.uri, Vec::new(), None)
            .await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some(doc) = self.state.documents.get(&uri) else {
            return Ok(None);
        };
        let Some(word) = word_at(&doc.entry.text, position.line, position.character) else {
            return Ok(None);
        };
        let Some(symbol) = find_symbol_at_position(
            &doc.entry.analysis,
            &word,
            position.line + 1,
            position.character + 1,
        ) else {
            return Ok(None);
        };

        let kind = match symbol.kind {
            TovaSymbolKind::Variable => "variable",
            TovaSymbolKind::Function => "function",
            TovaSymbolKind::Type => "type",
            TovaSymbolKind::Builtin => "builtin",
        };
        let mut text = format!("**{}** _{}_", symbol.name, kind);
        if let Some(detail) = symbol_detail(symbol) {
            text.push_str(&format!("\n\n```tova\n{}\n```", detail));
        }
        Ok(Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: text,
            }),
            range: None,
        }))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some(doc) = self.state.documents.get(&uri) else {
            return Ok(None);
        };
        let Some(word) = word_at(&doc.entry.text, position.line, position.character) else {
            return Ok(None);
        };
        let Some(symbol) = find_symbol_at_position(
            &doc.entry.analysis,
            &word,
            position.line + 1,
            position.character + 1,
        ) else {
            return Ok(None);
        };
        if symbol.kind == TovaSymbolKind::Builtin {
            return Ok(None);
        }
        Ok(Some(GotoDefinitionResponse::Scalar(Location {
            uri: uri.clone(),
            range: span_range(&symbol.span),
        })))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let uri = params.text_document.uri;
        let Some(doc) = self.state.documents.get(&uri) else {
            return Ok(None);
        };
        #[allow(deprecated)]
        let symbols: Vec<SymbolInformation> = collect_symbols(&doc.entry.analysis)
            .into_iter()
            .map(|info| SymbolInformation {
                name: info.name,
                kind: match info.kind {
                    TovaSymbolKind::Function => SymbolKind::FUNCTION,
                    TovaSymbolKind::Type => SymbolKind::STRUCT,
                    _ => SymbolKind::VARIABLE,
                },
                tags: None,
                deprecated: None,
                location: Location {
                    uri: uri.clone(),
                    range: span_range(&tova_base::Span::new(
                        0,
                        0,
                        info.line,
                        info.column,
                    )),
                },
                container_name: None,
            })
            .collect();
        Ok(Some(DocumentSymbolResponse::Flat(symbols)))
    }
}
