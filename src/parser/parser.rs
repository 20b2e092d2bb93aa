//! Command Parser for ntscript
//!
//! Turns script text into an ordered list of [`CommandNode`]s, checking
//! every command statically as it goes:
//!
//!   script   ::= (unit NEWLINE)*            one command per unit
//!   unit     ::= blank | '#' comment | command
//!   command  ::= NAME arg*
//!   arg      ::= 'true' | 'false'           bool
//!              | '"' text '"' | "'" text "'"  string, `$(name)` markers
//!              | '`' command '`'            sub-command
//!              | '$(' name ')'              variable / internal reference
//!              | '@' IDENT                  binding target
//!              | FLOAT
//!
//! Parsing stops at the first error, which carries the unit's first line.

use std::io::BufRead;

use crate::ast::types::{as_reference, CommandNode, ExprNode};
use crate::commands::registry::CommandRegistry;
use crate::commands::types::CommandKind;
use crate::interpreter::namespace::InternalNamespace;
use crate::interpreter::types::ValueType;
use crate::parser::scanner::{is_valid_identifier, Arguments, CommandScanner};
use crate::parser::symbols::SymbolTable;
use crate::parser::types::{ParseErrorKind, ParseException, ParseLimits};

const TRIM_CHARS: &[char] = &[' ', '\t', '\n', '\r'];

lazy_static::lazy_static! {
    /// Any `$(...)` run inside a string literal, well-formed or not.
    static ref STRING_MARKER: regex_lite::Regex = regex_lite::Regex::new(r"\$\((.*?)\)").unwrap();
}

/// Parser for one script. Owns the symbol table for the whole file.
pub struct Parser<'a> {
    registry: &'a CommandRegistry,
    namespace: &'a InternalNamespace,
    symbols: SymbolTable,
    limits: ParseLimits,
}

impl<'a> Parser<'a> {
    pub fn new(registry: &'a CommandRegistry, namespace: &'a InternalNamespace) -> Self {
        Self {
            registry,
            namespace,
            symbols: SymbolTable::new(),
            limits: ParseLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ParseLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Parse a whole script held in memory.
    pub fn parse(self, text: &str) -> Result<Vec<CommandNode>, ParseException> {
        self.parse_reader(text.as_bytes())
    }

    /// Parse a whole script, reading it incrementally.
    ///
    /// The symbol table is dropped with the parser once the script is done.
    pub fn parse_reader<R: BufRead>(mut self, reader: R) -> Result<Vec<CommandNode>, ParseException> {
        let mut scanner = CommandScanner::new(reader, self.limits.max_input_size);
        let mut commands = Vec::new();

        while let Some(unit) = scanner.next() {
            let (line, unit) = unit.map_err(|kind| ParseException::new(scanner.line(), kind))?;
            let text = unit.trim_matches(TRIM_CHARS);
            if text.is_empty() || text.starts_with('#') {
                continue;
            }

            let cmd = self
                .parse_command(text, line)
                .map_err(|kind| ParseException::new(line, kind))?;
            tracing::debug!(line, command = %cmd.name, args = cmd.args.len(), "parsed command");
            commands.push(cmd);
        }

        tracing::debug!(commands = commands.len(), variables = self.symbols.len(), "parse finished");
        Ok(commands)
    }

    /// Parse one top-level command unit.
    pub fn parse_command(&mut self, text: &str, line: usize) -> Result<CommandNode, ParseErrorKind> {
        self.parse_invocation(text, line, 0)
    }

    /// Parse `name arg...` at the given back-quote nesting depth.
    fn parse_invocation(
        &mut self,
        text: &str,
        line: usize,
        depth: usize,
    ) -> Result<CommandNode, ParseErrorKind> {
        if depth > self.limits.max_depth {
            return Err(ParseErrorKind::TooDeep(self.limits.max_depth));
        }

        let mut tokens = Arguments::new(text);
        let name = tokens.next().ok_or(ParseErrorKind::EmptyExpression)?;
        let handler = self
            .registry
            .get(name)
            .ok_or_else(|| ParseErrorKind::UnknownCommand(name.to_string()))?;

        match (depth, handler.kind()) {
            (0, CommandKind::SubCommand(_)) => {
                return Err(ParseErrorKind::SubCommandAtTopLevel(name.to_string()));
            }
            (d, CommandKind::Statement | CommandKind::Binding) if d > 0 => {
                return Err(ParseErrorKind::NotASubCommand(name.to_string()));
            }
            _ => {}
        }

        let args = tokens
            .map(|token| self.parse_expr(token, line, depth))
            .collect::<Result<Vec<_>, _>>()?;

        handler.check(&args, &mut self.symbols)?;
        Ok(CommandNode::new(handler, line, args))
    }

    /// Classify one argument token and build its expression node.
    pub fn parse_expr(
        &mut self,
        raw: &str,
        line: usize,
        depth: usize,
    ) -> Result<ExprNode, ParseErrorKind> {
        let text = raw.trim_matches(TRIM_CHARS);
        if text.is_empty() {
            return Err(ParseErrorKind::EmptyExpression);
        }

        if text == "true" || text == "false" {
            return Ok(ExprNode::BoolLiteral(text.to_string()));
        }
        if let Some(inner) = unwrap_run(text, '"').or_else(|| unwrap_run(text, '\'')) {
            return self.parse_string(inner);
        }
        if let Some(inner) = unwrap_run(text, '`') {
            let cmd = self.parse_invocation(inner, line, depth + 1)?;
            return Ok(ExprNode::SubCommand(Box::new(cmd)));
        }
        if let Some(name) = as_reference(text) {
            return self.parse_reference(name, text);
        }
        if let Some(id) = text.strip_prefix('@') {
            if !is_valid_identifier(id) {
                return Err(ParseErrorKind::InvalidIdentifier(id.to_string()));
            }
            return Ok(ExprNode::Identity(id.to_string()));
        }

        match text.parse::<f64>() {
            Ok(_) => Ok(ExprNode::FloatLiteral(text.to_string())),
            Err(_) => Err(ParseErrorKind::InvalidExpression(text.to_string())),
        }
    }

    /// A token that is exactly `$(name)`: typed by what `name` is bound to.
    fn parse_reference(&self, name: &str, text: &str) -> Result<ExprNode, ParseErrorKind> {
        if name.contains('.') {
            let value_type = self.internal_type(name)?;
            return Ok(ExprNode::InternalRef {
                path: name.to_string(),
                value_type,
            });
        }
        if !is_valid_identifier(name) {
            return Err(ParseErrorKind::InvalidVariable(text.to_string()));
        }

        let text = text.to_string();
        match self.symbols.get(name) {
            Some(ValueType::Bool) => Ok(ExprNode::BoolLiteral(text)),
            Some(ValueType::Float) => Ok(ExprNode::FloatLiteral(text)),
            Some(ValueType::String) => Ok(ExprNode::StringLiteral(text)),
            None => Err(ParseErrorKind::UndefinedVariable(name.to_string())),
        }
    }

    /// A quoted string: every `$(name)` marker must resolve now.
    fn parse_string(&self, text: &str) -> Result<ExprNode, ParseErrorKind> {
        for caps in STRING_MARKER.captures_iter(text) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            if name.contains('.') {
                self.internal_type(name)?;
            } else if !is_valid_identifier(name) {
                return Err(ParseErrorKind::InvalidVariable(format!("$({})", name)));
            } else if !self.symbols.contains(name) {
                return Err(ParseErrorKind::UndefinedVariable(name.to_string()));
            }
        }
        Ok(ExprNode::StringLiteral(text.to_string()))
    }

    fn internal_type(&self, path: &str) -> Result<ValueType, ParseErrorKind> {
        let namespace = path.split('.').next().unwrap_or(path);
        if !self.namespace.has_namespace(namespace) {
            return Err(ParseErrorKind::UnknownInternal(namespace.to_string()));
        }
        self.namespace
            .value_type(path)
            .ok_or_else(|| ParseErrorKind::UnknownInternal(path.to_string()))
    }
}

/// Strip one matching `delim` from both ends of `text`.
fn unwrap_run(text: &str, delim: char) -> Option<&str> {
    if text.len() >= 2 && text.starts_with(delim) && text.ends_with(delim) {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

/// Parse a script with the given registry and namespace.
pub fn parse(
    text: &str,
    registry: &CommandRegistry,
    namespace: &InternalNamespace,
) -> Result<Vec<CommandNode>, ParseException> {
    Parser::new(registry, namespace).parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::types::ExprType;
    use crate::commands::registry::create_default_registry;

    fn parse_ok(text: &str) -> Vec<CommandNode> {
        let registry = create_default_registry();
        let namespace = InternalNamespace::default();
        parse(text, &registry, &namespace).unwrap()
    }

    fn parse_err(text: &str) -> ParseException {
        let registry = create_default_registry();
        let namespace = InternalNamespace::default();
        parse(text, &registry, &namespace).unwrap_err()
    }

    fn types(cmd: &CommandNode) -> Vec<ExprType> {
        cmd.args.iter().map(|a| a.expr_type()).collect()
    }

    #[test]
    fn test_literal_classification() {
        let cmds = parse_ok("echo true 1.5 \"a b\" 'c' -2");
        assert_eq!(cmds.len(), 1);
        assert_eq!(
            types(&cmds[0]),
            vec![ExprType::Bool, ExprType::Float, ExprType::String, ExprType::String, ExprType::Float]
        );
        assert_eq!(cmds[0].args[2], ExprNode::StringLiteral("a b".to_string()));
    }

    #[test]
    fn test_skips_blank_and_comment_lines() {
        let cmds = parse_ok("\n# comment\n   \necho 1\n  # indented comment\necho 2\n");
        let lines: Vec<usize> = cmds.iter().map(|c| c.line).collect();
        assert_eq!(lines, vec![4, 6]);
    }

    #[test]
    fn test_variable_reference_takes_bound_type() {
        let cmds = parse_ok("let @a true\nlet @b 2\nlet @c \"s\"\necho $(a) $(b) $(c)");
        assert_eq!(
            types(&cmds[3]),
            vec![ExprType::Bool, ExprType::Float, ExprType::String]
        );
        assert_eq!(cmds[3].args[1], ExprNode::FloatLiteral("$(b)".to_string()));
    }

    #[test]
    fn test_sub_command_argument() {
        let cmds = parse_ok("let @home `env \"HOME\"`");
        match &cmds[0].args[1] {
            ExprNode::SubCommand(cmd) => {
                assert_eq!(cmd.name, "env");
                assert_eq!(cmd.args, vec![ExprNode::StringLiteral("HOME".to_string())]);
            }
            other => panic!("expected sub-command, got {:?}", other),
        }
        assert_eq!(cmds[0].args[1].value_type(), Some(ValueType::String));
    }

    #[test]
    fn test_sub_command_binding_is_string() {
        let cmds = parse_ok("let @h `env \"HOME\"`\necho \"$(h)\"\nlet @h \"other\"");
        assert_eq!(cmds.len(), 3);
        let err = parse_err("let @h `env \"HOME\"`\nlet @h 1");
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, ParseErrorKind::Rebinding { .. }));
    }

    #[test]
    fn test_internal_reference() {
        let cmds = parse_ok("echo $(ntscript.version)\nlet @v $(ntscript.name)\necho \"$(v)\"");
        assert_eq!(
            cmds[0].args[0],
            ExprNode::InternalRef {
                path: "ntscript.version".to_string(),
                value_type: ValueType::String,
            }
        );
        assert_eq!(cmds.len(), 3);
    }

    #[test]
    fn test_internal_reference_in_string() {
        let cmds = parse_ok("echo \"v=$(ntscript.version)\"");
        assert_eq!(cmds[0].args[0].variables(), vec!["ntscript.version"]);
    }

    #[test]
    fn test_unknown_internal_reference() {
        let err = parse_err("echo $(nope.version)");
        assert!(matches!(err.kind, ParseErrorKind::UnknownInternal(ref ns) if ns == "nope"));
        let err = parse_err("echo \"$(ntscript.nope)\"");
        assert!(matches!(err.kind, ParseErrorKind::UnknownInternal(_)));
    }

    #[test]
    fn test_forward_reference_names_line() {
        let err = parse_err("echo 1\n\necho \"$(x)\"\nlet @x 1");
        assert_eq!(err.line, 3);
        assert!(matches!(err.kind, ParseErrorKind::UndefinedVariable(ref n) if n == "x"));

        let err = parse_err("let @y $(y)");
        assert!(matches!(err.kind, ParseErrorKind::UndefinedVariable(_)));
    }

    #[test]
    fn test_rebinding_rules() {
        let cmds = parse_ok("let @x 1\nlet @x 2");
        assert_eq!(cmds.len(), 2);

        let err = parse_err("let @x 1\nlet @x \"one\"");
        assert_eq!(err.line, 2);
        assert!(matches!(
            err.kind,
            ParseErrorKind::Rebinding { previous: ValueType::Float, new: ValueType::String, .. }
        ));
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_err("echo 1\nfrobnicate 2");
        assert_eq!(err.line, 2);
        assert_eq!(err.to_string(), "line 2: unknown cmd: frobnicate");
    }

    #[test]
    fn test_sub_command_placement() {
        let err = parse_err("env \"HOME\"");
        assert!(matches!(err.kind, ParseErrorKind::SubCommandAtTopLevel(_)));
        let err = parse_err("echo `echo 1`");
        assert!(matches!(err.kind, ParseErrorKind::NotASubCommand(_)));
        let err = parse_err("echo `nothing 1`");
        assert!(matches!(err.kind, ParseErrorKind::UnknownCommand(_)));
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(matches!(parse_err("let @1x 1").kind, ParseErrorKind::InvalidIdentifier(_)));
        assert!(matches!(parse_err("let @a.b 1").kind, ParseErrorKind::InvalidIdentifier(_)));
        assert!(matches!(parse_err("echo abc").kind, ParseErrorKind::InvalidExpression(_)));
        assert!(matches!(parse_err("echo $(1a)").kind, ParseErrorKind::InvalidVariable(_)));
        assert!(matches!(parse_err("echo \"$(a b)\"").kind, ParseErrorKind::InvalidVariable(_)));
    }

    #[test]
    fn test_arity_and_type_errors() {
        assert!(matches!(parse_err("echo").kind, ParseErrorKind::TooFewArguments { .. }));
        assert!(matches!(parse_err("let @x").kind, ParseErrorKind::Arity { actual: 1, .. }));
        assert!(matches!(
            parse_err("let x 1").kind,
            ParseErrorKind::InvalidExpression(_)
        ));
        assert!(matches!(
            parse_err("let 1 1").kind,
            ParseErrorKind::ArgumentType { index: 0, .. }
        ));
        assert!(matches!(
            parse_err("let @x @y").kind,
            ParseErrorKind::ArgumentType { index: 1, .. }
        ));
        assert!(matches!(
            parse_err("let @x `env 1`").kind,
            ParseErrorKind::ArgumentType { index: 0, .. }
        ));
    }

    #[test]
    fn test_env_accepts_string_valued_internal() {
        let cmds = parse_ok("let @n `env $(ntscript.name)`");
        match &cmds[0].args[1] {
            ExprNode::SubCommand(cmd) => assert!(matches!(
                cmd.args[0],
                ExprNode::InternalRef { value_type: ValueType::String, .. }
            )),
            other => panic!("expected sub-command, got {:?}", other),
        }
        assert!(matches!(
            parse_err("let @v `env $(ntscript.missing)`").kind,
            ParseErrorKind::UnknownInternal(_)
        ));
    }

    #[test]
    fn test_multiline_single_quoted_argument() {
        let cmds = parse_ok("echo '{\n  \"key\": \"value\"\n}'\necho 2");
        assert_eq!(cmds.len(), 2);
        assert_eq!(
            cmds[0].args[0],
            ExprNode::StringLiteral("{\n  \"key\": \"value\"\n}".to_string())
        );
        assert_eq!(cmds[1].line, 4);
    }

    #[test]
    fn test_depth_limit() {
        let registry = create_default_registry();
        let namespace = InternalNamespace::default();
        let limits = ParseLimits { max_depth: 0, ..ParseLimits::default() };
        let err = Parser::new(&registry, &namespace)
            .with_limits(limits)
            .parse("let @h `env \"HOME\"`")
            .unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::TooDeep(0)));
    }

    #[test]
    fn test_input_limit() {
        let registry = create_default_registry();
        let namespace = InternalNamespace::default();
        let limits = ParseLimits { max_input_size: 8, ..ParseLimits::default() };
        let err = Parser::new(&registry, &namespace)
            .with_limits(limits)
            .parse("echo 1\necho 2\necho 3\n")
            .unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InputTooLarge(8)));
    }

    #[test]
    fn test_symbols_after_commands() {
        let registry = create_default_registry();
        let namespace = InternalNamespace::default();
        let mut parser = Parser::new(&registry, &namespace);
        parser.parse_command("let @flag false", 1).unwrap();
        parser.parse_command("let @n 3", 2).unwrap();
        assert_eq!(parser.symbols().get("flag"), Some(ValueType::Bool));
        assert_eq!(parser.symbols().get("n"), Some(ValueType::Float));
        assert!(parser.parse_command("echo $(flag) $(n)", 3).is_ok());
    }
}
