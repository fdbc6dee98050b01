// Copyright (C) 2025 The gloss authors. This program is free software: you can
// redistribute it and/or modify it under the terms of the GNU General Public
// License as published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! The renderer walks the program recording bindings, substituting resolved
//! values into every emitted line, and finally colorizing condition headers
//! that fold to a literal boolean. Output lines are assembled from
//! column-keyed fragments so constructs keep their source positions.

use std::collections::{BTreeMap, HashMap, HashSet};

use gloss_syntax::ast::{Declarator, Expr, ForInit, Program, Stmt, StmtNode};
use gloss_syntax::{get_precedence, parse_expression, parse_program, unparse_expr};
use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use crate::bindings::{BindingStore, Rendered};
use crate::eval::{Lookup, Tag, Value, evaluate};
use crate::regions::{ConditionStack, RegionId, RegionRegistry};

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum RenderError {
    #[error("line {line}: unsupported construct: {found}")]
    UnsupportedNode { line: usize, found: String },
    #[error("line {line}: malformed program: {found}")]
    MalformedNode { line: usize, found: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] gloss_syntax::ParseError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Colorize while/do-while/for headers too, not only if/else-if arms.
    pub color_loop_headers: bool,
    /// A resolved scalar longer than this renders parenthesized at its use
    /// site, so a compound value keeps its grouping inside a larger
    /// expression.
    pub paren_threshold: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color_loop_headers: true,
            paren_threshold: 2,
        }
    }
}

/// A binding known before traversal begins, e.g. a caller-provided argument
/// value. Seeded names do not join the input set: their uses still render
/// symbolically, but conditions over them can fold and color.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SeedBinding {
    pub line: usize,
    pub conditions: Vec<RegionId>,
    pub value: Rendered,
}

pub type SymbolTable = HashMap<String, Vec<SeedBinding>>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RenderedLine {
    pub line: usize,
    pub text: String,
    pub tag: Tag,
}

/// A condition header captured during the walk, re-evaluated afterwards to
/// decide the line's tag.
struct Header {
    line: usize,
    condition: String,
    conditions: Vec<RegionId>,
}

/// Render `source` with default options.
pub fn run(source: &str, seeds: &SymbolTable) -> Result<Vec<RenderedLine>, EngineError> {
    run_with_options(source, seeds, RenderOptions::default())
}

pub fn run_with_options(
    source: &str,
    seeds: &SymbolTable,
    options: RenderOptions,
) -> Result<Vec<RenderedLine>, EngineError> {
    let program = parse_program(source)?;
    debug!(statements = program.body.len(), "parsed program");
    let mut renderer = Renderer::new(options);
    renderer.seed(seeds);
    renderer.render_program(&program)?;
    Ok(renderer.finish())
}

struct Renderer {
    options: RenderOptions,
    /// Names that stay symbolic: function parameters and top-level
    /// declarations.
    inputs: HashSet<String>,
    store: BindingStore,
    stack: ConditionStack,
    regions: RegionRegistry,
    /// line -> column -> fragment; assembled into padded text at the end.
    lines: BTreeMap<usize, BTreeMap<usize, String>>,
    headers: Vec<Header>,
    current_line: usize,
    inside_function: bool,
}

impl Renderer {
    fn new(options: RenderOptions) -> Self {
        Renderer {
            options,
            inputs: HashSet::new(),
            store: BindingStore::default(),
            stack: ConditionStack::default(),
            regions: RegionRegistry::default(),
            lines: BTreeMap::new(),
            headers: Vec::new(),
            current_line: 0,
            inside_function: false,
        }
    }

    fn seed(&mut self, seeds: &SymbolTable) {
        for (name, bindings) in seeds {
            for seed in bindings {
                self.store.record(
                    name,
                    seed.line,
                    seed.conditions.clone(),
                    Some(seed.value.clone()),
                );
            }
        }
    }

    fn render_program(&mut self, program: &Program) -> Result<(), RenderError> {
        // Top-level statements run before any function body references their
        // bindings, so they render first; functions follow in source order.
        let (functions, toplevel): (Vec<&Stmt>, Vec<&Stmt>) = program
            .body
            .iter()
            .partition(|stmt| matches!(stmt.node, StmtNode::Function { .. }));
        for stmt in toplevel {
            self.render_stmt(stmt)?;
        }
        for stmt in functions {
            self.render_stmt(stmt)?;
        }
        Ok(())
    }

    fn emit(&mut self, line: usize, column: usize, text: String) {
        self.lines.entry(line).or_default().insert(column, text);
    }

    fn snapshot(&self) -> Vec<RegionId> {
        self.stack.snapshot()
    }

    fn render_stmt(&mut self, stmt: &Stmt) -> Result<(), RenderError> {
        self.current_line = stmt.span.line;
        match &stmt.node {
            StmtNode::Function { name, params, body } => {
                for param in params {
                    self.inputs.insert(param.clone());
                }
                let header = format!("function {name}({})", params.iter().join(","));
                self.emit(stmt.span.line, stmt.span.column, header);
                let was_inside = self.inside_function;
                self.inside_function = true;
                self.render_stmt(body)?;
                self.inside_function = was_inside;
                Ok(())
            }
            StmtNode::Decl { kind, declarators } => {
                let promote = !self.inside_function;
                let pieces = self.record_declarators(stmt.span.line, declarators, promote)?;
                // In-function declarations fold into later substitutions and
                // leave no output line of their own.
                if !self.inside_function {
                    let text = format!("{kind} {};", pieces.join(", "));
                    self.emit(stmt.span.line, stmt.span.column, text);
                }
                Ok(())
            }
            StmtNode::Expr(expr) => self.render_expr_stmt(stmt, expr),
            StmtNode::If { arms, otherwise } => {
                let mut predecessor: Option<RegionId> = None;
                for (i, arm) in arms.iter().enumerate() {
                    self.current_line = arm.span.line;
                    let condition = self.render_value(&arm.condition)?.display();
                    let region = arm.span.line;
                    match predecessor {
                        None => self.regions.declare(region),
                        Some(prior) => self.regions.declare_continuation(region, prior),
                    }
                    self.headers.push(Header {
                        line: arm.span.line,
                        condition: condition.clone(),
                        conditions: self.snapshot(),
                    });
                    let keyword = if i == 0 { "if" } else { "else if" };
                    self.emit(arm.span.line, arm.span.column, format!("{keyword}({condition})"));
                    self.stack.push(region);
                    self.render_stmt(&arm.body)?;
                    self.stack.pop();
                    predecessor = Some(region);
                }
                if let Some(arm) = otherwise {
                    let region = arm.span.line;
                    // The grammar only admits an else after an if arm.
                    self.regions
                        .declare_continuation(region, predecessor.unwrap_or(region));
                    self.emit(arm.span.line, arm.span.column, "else".to_string());
                    self.stack.push(region);
                    self.render_stmt(&arm.body)?;
                    self.stack.pop();
                }
                Ok(())
            }
            StmtNode::While { condition, body } => {
                let condition = self.render_value(condition)?.display();
                if self.options.color_loop_headers {
                    self.headers.push(Header {
                        line: stmt.span.line,
                        condition: condition.clone(),
                        conditions: self.snapshot(),
                    });
                }
                self.emit(stmt.span.line, stmt.span.column, format!("while({condition})"));
                self.enter_loop(stmt.span.line, body)
            }
            StmtNode::DoWhile {
                body,
                condition,
                test_span,
            } => {
                self.emit(stmt.span.line, stmt.span.column, "do".to_string());
                self.enter_loop(stmt.span.line, body)?;
                self.current_line = test_span.line;
                let condition = self.render_value(condition)?.display();
                if self.options.color_loop_headers {
                    self.headers.push(Header {
                        line: test_span.line,
                        condition: condition.clone(),
                        conditions: self.snapshot(),
                    });
                }
                self.emit(test_span.line, test_span.column, format!("while({condition});"));
                Ok(())
            }
            StmtNode::For {
                init,
                test,
                update,
                body,
            } => {
                let init = match init {
                    Some(ForInit::Decl { kind, declarators }) => {
                        let pieces =
                            self.record_declarators(stmt.span.line, declarators, false)?;
                        format!("{kind} {}", pieces.join(", "))
                    }
                    Some(ForInit::Expr(expr)) => self.render_value(expr)?.display(),
                    None => String::new(),
                };
                let test_text = match test {
                    Some(expr) => self.render_value(expr)?.display(),
                    None => String::new(),
                };
                if self.options.color_loop_headers && !test_text.is_empty() {
                    self.headers.push(Header {
                        line: stmt.span.line,
                        condition: test_text.clone(),
                        conditions: self.snapshot(),
                    });
                }
                let update = match update {
                    Some(expr) => self.render_value(expr)?.display(),
                    None => String::new(),
                };
                self.emit(
                    stmt.span.line,
                    stmt.span.column,
                    format!("for({init}; {test_text}; {update})"),
                );
                self.enter_loop(stmt.span.line, body)
            }
            StmtNode::Return(value) => {
                let text = match value {
                    Some(expr) => format!("return {};", self.render_value(expr)?.display()),
                    None => "return;".to_string(),
                };
                self.emit(stmt.span.line, stmt.span.column, text);
                Ok(())
            }
            StmtNode::Block(body) => {
                self.emit(stmt.span.line, stmt.span.column, "{".to_string());
                for child in body {
                    self.render_stmt(child)?;
                }
                self.emit(
                    stmt.span.end_line,
                    stmt.span.end_column.saturating_sub(1),
                    "}".to_string(),
                );
                Ok(())
            }
        }
    }

    fn enter_loop(&mut self, region: RegionId, body: &Stmt) -> Result<(), RenderError> {
        self.regions.declare(region);
        self.stack.push(region);
        self.render_stmt(body)?;
        self.stack.pop();
        Ok(())
    }

    fn record_declarators(
        &mut self,
        line: usize,
        declarators: &[Declarator],
        promote: bool,
    ) -> Result<Vec<String>, RenderError> {
        let mut pieces = Vec::with_capacity(declarators.len());
        for declarator in declarators {
            let value = match &declarator.init {
                Some(init) => Some(self.render_value(init)?),
                None => None,
            };
            self.store
                .record(&declarator.name, line, self.snapshot(), value.clone());
            if promote {
                self.inputs.insert(declarator.name.clone());
            }
            pieces.push(match value {
                Some(value) => format!("{} = {}", declarator.name, value.display()),
                None => declarator.name.clone(),
            });
        }
        Ok(pieces)
    }

    fn render_expr_stmt(&mut self, stmt: &Stmt, expr: &Expr) -> Result<(), RenderError> {
        match expr {
            Expr::Assign { left, right } => {
                let (target, value, visible) = self.apply_assignment(left, right)?;
                if visible {
                    self.emit(
                        stmt.span.line,
                        stmt.span.column,
                        format!("{target} = {};", value.display()),
                    );
                }
                Ok(())
            }
            // Free-standing updates record nothing and emit nothing; their
            // text only matters in expression position (for-loop clauses).
            Expr::Update { .. } => Ok(()),
            // Other expression statements fold away.
            _ => self.render_value(expr).map(|_| ()),
        }
    }

    /// Record an assignment and return the target text, the rendered value,
    /// and whether the line is emitted (only input-set targets survive in
    /// the output).
    fn apply_assignment(
        &mut self,
        left: &Expr,
        right: &Expr,
    ) -> Result<(String, Rendered, bool), RenderError> {
        match left {
            Expr::Id(name) => {
                if !self.inputs.contains(name) && self.store.history(name).is_empty() {
                    return Err(RenderError::MalformedNode {
                        line: self.current_line,
                        found: format!("assignment to undeclared `{name}`"),
                    });
                }
                let value = self.render_value(right)?;
                self.store
                    .record(name, self.current_line, self.snapshot(), Some(value.clone()));
                Ok((name.clone(), value, self.inputs.contains(name)))
            }
            Expr::Index(base, index) => {
                let Expr::Id(name) = &**base else {
                    return Err(RenderError::UnsupportedNode {
                        line: self.current_line,
                        found: format!("assignment through `{}`", unparse_expr(base)),
                    });
                };
                if !self.inputs.contains(name) && self.store.history(name).is_empty() {
                    return Err(RenderError::MalformedNode {
                        line: self.current_line,
                        found: format!("indexed assignment to undeclared `{name}`"),
                    });
                }
                let index = self.render_value(index)?.display();
                let value = self.render_value(right)?;
                // Updating the stored array needs a constant in-range index;
                // anything else records nothing and later reads stay
                // symbolic.
                let resolved = self
                    .store
                    .resolve(name, self.current_line, self.stack.as_slice(), &self.regions)
                    .cloned();
                if let (Some(Rendered::Array(mut elements)), Ok(i)) =
                    (resolved, index.parse::<usize>())
                    && i < elements.len()
                {
                    elements[i] = value.display();
                    self.store.record(
                        name,
                        self.current_line,
                        self.snapshot(),
                        Some(Rendered::Array(elements)),
                    );
                }
                Ok((
                    format!("{name}[{index}]"),
                    value,
                    self.inputs.contains(name),
                ))
            }
            _ => Err(RenderError::UnsupportedNode {
                line: self.current_line,
                found: format!("assignment to `{}`", unparse_expr(left)),
            }),
        }
    }

    fn render_value(&mut self, expr: &Expr) -> Result<Rendered, RenderError> {
        match expr {
            Expr::Id(name) => Ok(self.render_identifier(name)),
            Expr::Value(literal) => Ok(Rendered::Scalar(literal.source())),
            Expr::Array(elements) => {
                let mut rendered = Vec::with_capacity(elements.len());
                for element in elements {
                    rendered.push(self.render_value(element)?.display());
                }
                Ok(Rendered::Array(rendered))
            }
            Expr::Unary(op, operand) => {
                let operand = self.operand_text(operand, expr, false)?;
                Ok(Rendered::Scalar(format!("{op}{operand}")))
            }
            Expr::Binary(op, left, right) => {
                let left = self.operand_text(left, expr, false)?;
                let right = self.operand_text(right, expr, true)?;
                Ok(Rendered::Scalar(format!("{left} {op} {right}")))
            }
            Expr::And(left, right) => {
                let left = self.operand_text(left, expr, false)?;
                let right = self.operand_text(right, expr, true)?;
                Ok(Rendered::Scalar(format!("{left} && {right}")))
            }
            Expr::Or(left, right) => {
                let left = self.operand_text(left, expr, false)?;
                let right = self.operand_text(right, expr, true)?;
                Ok(Rendered::Scalar(format!("{left} || {right}")))
            }
            Expr::Update { op, prefix, target } => Ok(Rendered::Scalar(if *prefix {
                format!("{op}{target}")
            } else {
                format!("{target}{op}")
            })),
            Expr::Index(..) => self.render_member(expr),
            Expr::Assign { left, right } => {
                let (target, value, _) = self.apply_assignment(left, right)?;
                Ok(Rendered::Scalar(format!("{target} = {}", value.display())))
            }
        }
    }

    /// Render a child operand, parenthesizing when it binds more loosely
    /// than its parent (or equally, on the right side, to keep left
    /// association visible).
    fn operand_text(
        &mut self,
        child: &Expr,
        parent: &Expr,
        right_side: bool,
    ) -> Result<String, RenderError> {
        let text = self.render_value(child)?.display();
        let (child_prec, parent_prec) = (get_precedence(child), get_precedence(parent));
        if child_prec < parent_prec || (right_side && child_prec == parent_prec) {
            Ok(format!("({text})"))
        } else {
            Ok(text)
        }
    }

    fn render_identifier(&self, name: &str) -> Rendered {
        if self.inputs.contains(name) {
            return Rendered::Scalar(name.to_string());
        }
        match self
            .store
            .resolve(name, self.current_line, self.stack.as_slice(), &self.regions)
        {
            Some(Rendered::Scalar(text)) => {
                // A compound substituted value keeps its grouping when it
                // lands inside a larger expression.
                if text.len() > self.options.paren_threshold {
                    Rendered::Scalar(format!("({text})"))
                } else {
                    Rendered::Scalar(text.clone())
                }
            }
            Some(array) => array.clone(),
            None => Rendered::Scalar(name.to_string()),
        }
    }

    fn render_member(&mut self, member: &Expr) -> Result<Rendered, RenderError> {
        let Expr::Index(base, index) = member else {
            unreachable!("render_member called on {member:?}");
        };
        let index_text = self.render_value(index)?.display();
        let Expr::Id(name) = &**base else {
            let base = self.operand_text(base, member, false)?;
            return Ok(Rendered::Scalar(format!("{base}[{index_text}]")));
        };
        if !self.inputs.contains(name)
            && let Some(Rendered::Array(elements)) = self.store.resolve(
                name,
                self.current_line,
                self.stack.as_slice(),
                &self.regions,
            )
            && let Ok(i) = index_text.parse::<usize>()
            && let Some(element) = elements.get(i)
        {
            return Ok(Rendered::Scalar(element.clone()));
        }
        // Input-set bases, unresolved arrays and non-constant indexes stay
        // symbolic.
        Ok(Rendered::Scalar(format!("{name}[{index_text}]")))
    }

    fn finish(self) -> Vec<RenderedLine> {
        debug!(
            lines = self.lines.len(),
            headers = self.headers.len(),
            "assembling output"
        );
        let colorizer = Colorizer {
            store: &self.store,
            regions: &self.regions,
        };
        let mut tags: BTreeMap<usize, Tag> = BTreeMap::new();
        for header in &self.headers {
            tags.entry(header.line).or_insert_with(|| colorizer.tag(header));
        }
        let mut output = Vec::with_capacity(self.lines.len());
        for (line, fragments) in &self.lines {
            let mut text = String::new();
            let mut width = 0;
            for (&column, fragment) in fragments {
                // Columns are 1-based and count characters, not bytes; pad
                // with spaces up to the fragment's source position.
                while width + 1 < column {
                    text.push(' ');
                    width += 1;
                }
                text.push_str(fragment);
                width += fragment.chars().count();
            }
            output.push(RenderedLine {
                line: *line,
                text,
                tag: tags.get(line).copied().unwrap_or(Tag::None),
            });
        }
        output
    }
}

/// Post-pass deciding header tags. Resolution here ignores the input set:
/// a seeded value for a parameter keeps the parameter symbolic in the text,
/// but still folds the condition.
struct Colorizer<'a> {
    store: &'a BindingStore,
    regions: &'a RegionRegistry,
}

impl Colorizer<'_> {
    fn tag(&self, header: &Header) -> Tag {
        let Ok(condition) = parse_expression(&header.condition) else {
            return Tag::None;
        };
        let scope = HeaderScope {
            store: self.store,
            regions: self.regions,
            line: header.line,
            conditions: &header.conditions,
        };
        match evaluate(&condition, &scope, 0) {
            Some(value) if value.is_truthy() => Tag::True,
            Some(_) => Tag::False,
            None => Tag::None,
        }
    }
}

struct HeaderScope<'a> {
    store: &'a BindingStore,
    regions: &'a RegionRegistry,
    line: usize,
    conditions: &'a [RegionId],
}

impl Lookup for HeaderScope<'_> {
    fn scalar(&self, name: &str, depth: usize) -> Option<Value> {
        match self
            .store
            .resolve_executed(name, self.line, self.conditions, self.regions)?
        {
            Rendered::Scalar(text) => {
                let expr = parse_expression(text).ok()?;
                evaluate(&expr, self, depth + 1)
            }
            Rendered::Array(_) => None,
        }
    }

    fn element(&self, name: &str, index: usize, depth: usize) -> Option<Value> {
        match self
            .store
            .resolve_executed(name, self.line, self.conditions, self.regions)?
        {
            Rendered::Array(elements) => {
                let expr = parse_expression(elements.get(index)?).ok()?;
                evaluate(&expr, self, depth + 1)
            }
            Rendered::Scalar(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use unindent::unindent;

    use crate::bindings::Rendered;
    use crate::eval::Tag;
    use crate::render::{
        EngineError, RenderError, SeedBinding, SymbolTable, run,
    };

    fn lines(source: &str, seeds: &SymbolTable) -> Vec<(String, Tag)> {
        run(source, seeds)
            .unwrap()
            .into_iter()
            .map(|line| (line.text, line.tag))
            .collect()
    }

    fn no_seeds() -> SymbolTable {
        SymbolTable::new()
    }

    fn seed(name: &str, value: Rendered) -> SymbolTable {
        let mut seeds = SymbolTable::new();
        seeds.insert(
            name.to_string(),
            vec![SeedBinding {
                line: 0,
                conditions: vec![],
                value,
            }],
        );
        seeds
    }

    #[test]
    fn test_local_folds_into_return() {
        let source = unindent(
            r#"
            function func(x){
              let a = x;
              return a;
            }
            "#,
        );
        assert_eq!(
            lines(&source, &no_seeds()),
            vec![
                ("function func(x){".to_string(), Tag::None),
                ("  return x;".to_string(), Tag::None),
                ("}".to_string(), Tag::None),
            ]
        );
    }

    #[test]
    fn test_global_value_substitutes_with_grouping() {
        let source = unindent(
            r#"
            let x = 2;
            function func(){
              let a = x + 1;
              return a;
            }
            "#,
        );
        assert_eq!(
            lines(&source, &no_seeds()),
            vec![
                ("let x = 2;".to_string(), Tag::None),
                ("function func(){".to_string(), Tag::None),
                ("  return (x + 1);".to_string(), Tag::None),
                ("}".to_string(), Tag::None),
            ]
        );
    }

    #[test]
    fn test_nested_if_conditions_fold_and_color() {
        let source = unindent(
            r#"
            function func(){
              let x = 2;
              if (x > 1)
                if (x > 2)
                  x = x + 1;
              return x + 1;
            }
            "#,
        );
        assert_eq!(
            lines(&source, &no_seeds()),
            vec![
                ("function func(){".to_string(), Tag::None),
                ("  if(2 > 1)".to_string(), Tag::True),
                ("    if(2 > 2)".to_string(), Tag::False),
                ("  return 2 + 1;".to_string(), Tag::None),
                ("}".to_string(), Tag::None),
            ]
        );
    }

    #[test]
    fn test_closed_else_ladder_binding_reaches_the_return() {
        let source = unindent(
            r#"
            function func(x){
              let a = 0;
              if (x > 0)
                a = 1;
              else
                a = 2;
              return a;
            }
            "#,
        );
        assert_eq!(
            lines(&source, &no_seeds()),
            vec![
                ("function func(x){".to_string(), Tag::None),
                ("  if(x > 0)".to_string(), Tag::None),
                ("  else".to_string(), Tag::None),
                ("  return 2;".to_string(), Tag::None),
                ("}".to_string(), Tag::None),
            ]
        );
    }

    #[test]
    fn test_seeded_argument_colors_but_stays_symbolic() {
        let source = unindent(
            r#"
            function func(x){
              if (x > 1)
                return x;
            }
            "#,
        );
        let seeds = seed("x", Rendered::Scalar("2".to_string()));
        assert_eq!(
            lines(&source, &seeds),
            vec![
                ("function func(x){".to_string(), Tag::None),
                ("  if(x > 1)".to_string(), Tag::True),
                ("    return x;".to_string(), Tag::None),
                ("}".to_string(), Tag::None),
            ]
        );
    }

    #[test]
    fn test_local_array_reads_fold_to_elements() {
        let source = unindent(
            r#"
            function func(){
              let arr = [1, 2, 3];
              arr[2] = 4;
              if (arr[1] > arr[2])
                return arr[2] + 1;
            }
            "#,
        );
        assert_eq!(
            lines(&source, &no_seeds()),
            vec![
                ("function func(){".to_string(), Tag::None),
                ("  if(2 > 4)".to_string(), Tag::False),
                ("    return 4 + 1;".to_string(), Tag::None),
                ("}".to_string(), Tag::None),
            ]
        );
    }

    #[test]
    fn test_global_array_stays_symbolic_but_colors() {
        let source = unindent(
            r#"
            let arr = [1, 2, 3];
            function func(){
              let a = 0;
              arr[2] = 4;
              if (arr[1] > arr[a])
                return arr[2] + 1;
            }
            "#,
        );
        assert_eq!(
            lines(&source, &no_seeds()),
            vec![
                ("let arr = [1,2,3];".to_string(), Tag::None),
                ("function func(){".to_string(), Tag::None),
                ("  arr[2] = 4;".to_string(), Tag::None),
                ("  if(arr[1] > arr[0])".to_string(), Tag::True),
                ("    return arr[2] + 1;".to_string(), Tag::None),
                ("}".to_string(), Tag::None),
            ]
        );
    }

    #[test]
    fn test_while_header_colors_through_folded_locals() {
        let source = unindent(
            r#"
            let x = 1, y = 2;
            function func(){
              x++;
              let a = x;
              y = a + 1;
              while (a > y)
                return a + 1;
            }
            "#,
        );
        assert_eq!(
            lines(&source, &no_seeds()),
            vec![
                ("let x = 1, y = 2;".to_string(), Tag::None),
                ("function func(){".to_string(), Tag::None),
                ("  y = x + 1;".to_string(), Tag::None),
                ("  while(x > y)".to_string(), Tag::False),
                ("    return x + 1;".to_string(), Tag::None),
                ("}".to_string(), Tag::None),
            ]
        );
    }

    #[test]
    fn test_for_and_do_while_headers() {
        let source = unindent(
            r#"
            function func(){
              let i = 0;
              for (let j = 0; j < 3; j++)
                i = j;
              do
                i = i + 1;
              while (i < 10);
            }
            "#,
        );
        assert_eq!(
            lines(&source, &no_seeds()),
            vec![
                ("function func(){".to_string(), Tag::None),
                ("  for(let j = 0; 0 < 3; j++)".to_string(), Tag::True),
                ("  do".to_string(), Tag::None),
                ("  while(0 < 10);".to_string(), Tag::True),
                ("}".to_string(), Tag::None),
            ]
        );
    }

    #[test]
    fn test_branch_header_ignores_assignments_in_its_own_arms() {
        // The `x = 10` inside the consequent has not run when the condition
        // is tested, so the header folds against the global value.
        let source = unindent(
            r#"
            let x = 1;
            function func(){
              if (x > 5)
                x = 10;
              else
                x = 0;
              return x;
            }
            "#,
        );
        assert_eq!(
            lines(&source, &no_seeds()),
            vec![
                ("let x = 1;".to_string(), Tag::None),
                ("function func(){".to_string(), Tag::None),
                ("  if(x > 5)".to_string(), Tag::False),
                ("    x = 10;".to_string(), Tag::None),
                ("  else".to_string(), Tag::None),
                ("    x = 0;".to_string(), Tag::None),
                ("  return x;".to_string(), Tag::None),
                ("}".to_string(), Tag::None),
            ]
        );
    }

    #[test]
    fn test_later_self_reference_does_not_block_header_coloring() {
        let source = unindent(
            r#"
            let x = 2, y = 2;
            function func(){
              if (x > y)
                y = 5;
              else if (x < y)
                x = x + 1;
              return y;
            }
            "#,
        );
        assert_eq!(
            lines(&source, &no_seeds()),
            vec![
                ("let x = 2, y = 2;".to_string(), Tag::None),
                ("function func(){".to_string(), Tag::None),
                ("  if(x > y)".to_string(), Tag::False),
                ("    y = 5;".to_string(), Tag::None),
                ("  else if(x < y)".to_string(), Tag::True),
                ("    x = x + 1;".to_string(), Tag::None),
                ("  return y;".to_string(), Tag::None),
                ("}".to_string(), Tag::None),
            ]
        );
    }

    #[test]
    fn test_multibyte_literal_keeps_later_columns_aligned() {
        let source = unindent(
            r#"
            let x = 0;
            if ('é' === 'é') { x = 1; }
            "#,
        );
        assert_eq!(
            lines(&source, &no_seeds()),
            vec![
                ("let x = 0;".to_string(), Tag::None),
                ("if('é' === 'é')  { x = 1; }".to_string(), Tag::True),
            ]
        );
    }

    #[test]
    fn test_nested_member_write_is_unsupported() {
        let err = run("function f(x){ x[0][0] = 1; }", &SymbolTable::new()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Render(RenderError::UnsupportedNode { .. })
        ));
    }

    #[test]
    fn test_assignment_to_undeclared_is_malformed() {
        let err = run("function f(){ a[0] = 1; }", &SymbolTable::new()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Render(RenderError::MalformedNode { .. })
        ));
    }

    #[test]
    fn test_parse_errors_surface() {
        let err = run("function (", &SymbolTable::new()).unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let source = unindent(
            r#"
            let x = 1, y = 2;
            function func(a){
              if (a > x)
                y = a;
              else
                y = x;
              return y;
            }
            "#,
        );
        let first = run(&source, &no_seeds()).unwrap();
        let second = run(&source, &no_seeds()).unwrap();
        assert_eq!(first, second);
    }
}
