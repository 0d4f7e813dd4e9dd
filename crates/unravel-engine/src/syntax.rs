//! Parsing, printing, and the text/tree source unit.

use swc_core::common::input::StringInput;
use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, GLOBALS, Globals, SourceMap};
use swc_core::ecma::ast::Program;
use swc_core::ecma::codegen::Emitter;
use swc_core::ecma::codegen::text_writer::JsWriter;
use swc_core::ecma::parser::{EsSyntax, Parser, Syntax, TsSyntax};
use swc_core::ecma::transforms::base::fixer::fixer;
use swc_core::ecma::visit::VisitMutWith;
use tracing::warn;

use crate::error::{ParseError, PrintError};

/// Dialects tried in order. Plain JavaScript with JSX first, then TSX as the
/// superset fallback for type annotations and decorators.
fn dialects() -> [Syntax; 2] {
    [
        Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        }),
        Syntax::Typescript(TsSyntax {
            tsx: true,
            decorators: true,
            ..Default::default()
        }),
    ]
}

/// A parsed program together with the source map it was parsed against.
pub struct SyntaxTree {
    cm: Lrc<SourceMap>,
    pub program: Program,
}

impl SyntaxTree {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let cm: Lrc<SourceMap> = Default::default();
        let fm = cm.new_source_file(
            FileName::Custom("input.js".into()).into(),
            text.to_string(),
        );

        let mut last_error = None;
        for syntax in dialects() {
            let mut parser = Parser::new(syntax, StringInput::from(&*fm), None);
            match parser.parse_program() {
                Ok(program) => match parser.take_errors().into_iter().next() {
                    None => return Ok(Self { cm, program }),
                    Some(err) => last_error = Some(err),
                },
                Err(err) => last_error = Some(err),
            }
        }

        Err(match last_error {
            Some(err) => ParseError::new(err.kind().msg()),
            None => ParseError::new("no dialect accepted the input"),
        })
    }

    /// Print the program back to source text.
    ///
    /// Runs the paren fixer first, since rewrites can leave nodes in
    /// positions that need parentheses the tree does not carry.
    pub fn print(&mut self) -> Result<String, PrintError> {
        GLOBALS.set(&Globals::new(), || -> Result<String, PrintError> {
            self.program.visit_mut_with(&mut fixer(None));

            let mut buf = Vec::new();
            {
                let writer = JsWriter::new(self.cm.clone(), "\n", &mut buf, None);
                let mut emitter = Emitter {
                    cfg: Default::default(),
                    cm: self.cm.clone(),
                    comments: None,
                    wr: writer,
                };
                emitter.emit_program(&self.program)?;
            }
            Ok(String::from_utf8(buf)?)
        })
    }
}

/// Whether `text` parses in any supported dialect.
pub fn parses(text: &str) -> bool {
    SyntaxTree::parse(text).is_ok()
}

/// The program under transformation, held as text with an optional cached
/// tree.
///
/// Text-level edits discard the tree. Tree-level edits mark the text stale,
/// and the text is regenerated from the tree on next read. The two
/// representations are never both authoritative.
pub struct SourceUnit {
    text: String,
    tree: Option<SyntaxTree>,
    stale: bool,
}

impl SourceUnit {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tree: None,
            stale: false,
        }
    }

    /// Current source text, regenerated from the tree if a tree edit is
    /// pending.
    pub fn text(&mut self) -> &str {
        self.sync_text();
        &self.text
    }

    pub fn into_text(mut self) -> String {
        self.sync_text();
        self.text
    }

    pub fn replace_text(&mut self, text: String) {
        self.text = text;
        self.tree = None;
        self.stale = false;
    }

    /// Run `edit` against the parsed tree, parsing the current text first if
    /// needed. `edit` returns its result and whether it changed the tree.
    pub fn with_tree<R>(
        &mut self,
        edit: impl FnOnce(&mut SyntaxTree) -> (R, bool),
    ) -> Result<R, ParseError> {
        if self.tree.is_none() {
            self.sync_text();
            self.tree = Some(SyntaxTree::parse(&self.text)?);
        }
        let Some(tree) = self.tree.as_mut() else {
            return Err(ParseError::new("source tree unavailable"));
        };
        let (result, changed) = edit(tree);
        self.stale |= changed;
        Ok(result)
    }

    fn sync_text(&mut self) {
        if !self.stale {
            return;
        }
        self.stale = false;
        let Some(tree) = self.tree.as_mut() else {
            return;
        };
        match tree.print() {
            Ok(text) => self.text = text,
            Err(err) => {
                warn!(error = %err, "Failed to print transformed tree; keeping previous text");
                self.tree = None;
            }
        }
    }
}

#[cfg(test)]
#[path = "syntax_tests.rs"]
mod tests;
