//! QASM2 tokenizer/parser and the `cry` gate shim (spec §4.1, §6.2).
//!
//! The accepted grammar is small enough that a hand-written, line-oriented
//! parser reads more clearly than bringing in a parser-combinator crate —
//! the same judgment call the teacher crate made for its own matrix/complex
//! math instead of reaching for a linear-algebra crate that didn't yet
//! support what it needed.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::config::SimConfig;
use crate::error::SimError;
use crate::gate;
use crate::ir::{Circuit, Instruction};

/// The IR plus the metadata the validator needs, per spec §4.1.
pub struct ParseOutput {
    pub circuit: Circuit,
    pub gate_histogram: HashMap<String, u32>,
}

/// Parse a QASM2 source string into a [`ParseOutput`].
///
/// `cfg` is consulted only for the qubit-count bound on the `qreg`
/// declaration; operation-count and shot caps are the validator's job
/// (spec §4.2) — the parser only rejects malformed *syntax*.
pub fn parse(source: &str, cfg: &SimConfig) -> Result<ParseOutput, SimError> {
    let stripped = strip_comments(source);
    let shimmed = shim_cry(&stripped);
    let statements = split_statements(&shimmed);

    let mut st = ParserState::new(cfg);
    for stmt in &statements {
        st.handle(stmt)?;
    }
    st.finish()
}

struct Statement<'a> {
    line: usize,
    text: &'a str,
}

struct ParserState<'cfg> {
    cfg: &'cfg SimConfig,
    seen_version: bool,
    seen_include: bool,
    qreg_name: Option<String>,
    qreg_size: Option<usize>,
    creg_name: Option<String>,
    creg_size: Option<usize>,
    instructions: Vec<Instruction>,
    gate_histogram: HashMap<String, u32>,
}

impl<'cfg> ParserState<'cfg> {
    fn new(cfg: &'cfg SimConfig) -> Self {
        ParserState {
            cfg,
            seen_version: false,
            seen_include: false,
            qreg_name: None,
            qreg_size: None,
            creg_name: None,
            creg_size: None,
            instructions: Vec::new(),
            gate_histogram: HashMap::new(),
        }
    }

    fn bump_histogram(&mut self, key: &str) {
        *self.gate_histogram.entry(key.to_string()).or_insert(0) += 1;
    }

    fn handle(&mut self, stmt: &Statement) -> Result<(), SimError> {
        let text = stmt.text;
        let err = |reason: String| SimError::parse(stmt.line, reason);

        if text == "OPENQASM 2.0" {
            self.seen_version = true;
            return Ok(());
        }
        if text == "include \"qelib1.inc\"" {
            if !self.seen_version {
                return Err(err("include must follow the OPENQASM 2.0 header".into()));
            }
            self.seen_include = true;
            return Ok(());
        }
        if !self.seen_version || !self.seen_include {
            return Err(err(
                "expected 'OPENQASM 2.0;' followed by 'include \"qelib1.inc\";'".into(),
            ));
        }

        if let Some(rest) = text.strip_prefix("qreg ") {
            return self.handle_qreg(rest, stmt.line);
        }
        if let Some(rest) = text.strip_prefix("creg ") {
            return self.handle_creg(rest, stmt.line);
        }
        if text.starts_with("barrier") {
            self.instructions.push(Instruction::Barrier);
            self.bump_histogram("barrier");
            return Ok(());
        }
        if let Some(rest) = text.strip_prefix("measure") {
            return self.handle_measure(rest, stmt.line);
        }
        if let Some(rest) = text.strip_prefix("reset") {
            return self.handle_reset(rest, stmt.line);
        }

        self.handle_gate_application(text, stmt.line)
    }

    fn qreg_ref(&self) -> Result<(&str, usize), String> {
        match (&self.qreg_name, self.qreg_size) {
            (Some(name), Some(size)) => Ok((name.as_str(), size)),
            _ => Err("no qreg has been declared".into()),
        }
    }

    fn handle_qreg(&mut self, rest: &str, line: usize) -> Result<(), SimError> {
        if self.qreg_name.is_some() {
            return Err(SimError::parse(line, "only one qreg declaration is supported"));
        }
        let (name, size) = parse_register_decl(rest)
            .map_err(|e| SimError::parse(line, format!("malformed qreg declaration: {e}")))?;
        if size == 0 || size > self.cfg.max_qubits {
            return Err(SimError::parse(
                line,
                format!("qreg size {size} is outside the supported range 1..={}", self.cfg.max_qubits),
            ));
        }
        self.qreg_name = Some(name);
        self.qreg_size = Some(size);
        Ok(())
    }

    fn handle_creg(&mut self, rest: &str, line: usize) -> Result<(), SimError> {
        if self.creg_name.is_some() {
            return Err(SimError::parse(line, "only one creg declaration is supported"));
        }
        let (name, size) = parse_register_decl(rest)
            .map_err(|e| SimError::parse(line, format!("malformed creg declaration: {e}")))?;
        if size == 0 {
            return Err(SimError::parse(line, "creg size must be positive"));
        }
        self.creg_name = Some(name);
        self.creg_size = Some(size);
        Ok(())
    }

    fn handle_measure(&mut self, rest: &str, line: usize) -> Result<(), SimError> {
        let (qpart, cpart) = rest
            .split_once("->")
            .ok_or_else(|| SimError::parse(line, "measure requires '-> c[j]'"))?;
        let (qreg_name, qreg_size) =
            self.qreg_ref().map_err(|e| SimError::parse(line, e))?;
        let qubit = parse_qubit_ref(qpart.trim(), qreg_name, qreg_size)
            .map_err(|e| SimError::parse(line, e))?;

        let (creg_name, creg_size) = match (&self.creg_name, self.creg_size) {
            (Some(n), Some(s)) => (n.clone(), s),
            _ => return Err(SimError::parse(line, "measure target requires a declared creg")),
        };
        let _ = parse_classical_ref(cpart.trim(), &creg_name, creg_size)
            .map_err(|e| SimError::parse(line, e))?;

        self.instructions.push(Instruction::Measure { qubit });
        self.bump_histogram("measure");
        Ok(())
    }

    fn handle_reset(&mut self, rest: &str, line: usize) -> Result<(), SimError> {
        let (qreg_name, qreg_size) =
            self.qreg_ref().map_err(|e| SimError::parse(line, e))?;
        let qubit = parse_qubit_ref(rest.trim(), qreg_name, qreg_size)
            .map_err(|e| SimError::parse(line, e))?;
        self.instructions.push(Instruction::Reset { qubit });
        self.bump_histogram("reset");
        Ok(())
    }

    fn handle_gate_application(&mut self, text: &str, line: usize) -> Result<(), SimError> {
        let (name, params_src, args_src) =
            split_gate_application(text).map_err(|e| SimError::parse(line, e))?;
        let (qreg_name, qreg_size) =
            self.qreg_ref().map_err(|e| SimError::parse(line, e))?;

        let args: Vec<usize> = args_src
            .split(',')
            .map(|a| parse_qubit_ref(a.trim(), qreg_name, qreg_size))
            .collect::<Result<_, _>>()
            .map_err(|e| SimError::parse(line, e))?;

        let params: Vec<f64> = if params_src.trim().is_empty() {
            Vec::new()
        } else {
            params_src
                .split(',')
                .map(|p| eval_expr(p.trim()))
                .collect::<Result<_, _>>()
                .map_err(|e| SimError::parse(line, e))?
        };

        let instr = build_instruction(name, &params, &args)
            .map_err(|e| SimError::parse(line, e))?;
        self.instructions.push(instr);
        self.bump_histogram(name);
        Ok(())
    }

    fn finish(self) -> Result<ParseOutput, SimError> {
        if !self.seen_version || !self.seen_include {
            return Err(SimError::parse(
                0,
                "missing 'OPENQASM 2.0;' / 'include \"qelib1.inc\";' header".into(),
            ));
        }
        let num_qubits = self
            .qreg_size
            .ok_or_else(|| SimError::parse(0, "no qreg declaration found".to_string()))?;
        log::debug!(
            "parsed: num_qubits={num_qubits} num_operations={}",
            self.instructions.len()
        );
        Ok(ParseOutput {
            circuit: Circuit::new(num_qubits, self.instructions),
            gate_histogram: self.gate_histogram,
        })
    }
}

/// Build the concrete [`Instruction`] for a whitelisted gate name (spec §4.2).
fn build_instruction(name: &str, params: &[f64], args: &[usize]) -> Result<Instruction, String> {
    let one = |m: gate::Mat2| -> Result<Instruction, String> {
        expect_arity(args, 1, name)?;
        Ok(Instruction::Unitary1 { matrix: m, qubit: args[0] })
    };
    let controlled = |m: gate::Mat2| -> Result<Instruction, String> {
        expect_arity(args, 2, name)?;
        Ok(Instruction::Controlled1 { matrix: m, control: args[0], target: args[1] })
    };

    match name {
        "id" => { expect_params(params, 0, name)?; one(gate::id()) }
        "h" => { expect_params(params, 0, name)?; one(gate::h()) }
        "x" => { expect_params(params, 0, name)?; one(gate::x()) }
        "y" => { expect_params(params, 0, name)?; one(gate::y()) }
        "z" => { expect_params(params, 0, name)?; one(gate::z()) }
        "s" => { expect_params(params, 0, name)?; one(gate::s()) }
        "sdg" => { expect_params(params, 0, name)?; one(gate::sdg()) }
        "t" => { expect_params(params, 0, name)?; one(gate::t()) }
        "tdg" => { expect_params(params, 0, name)?; one(gate::tdg()) }
        "sx" => { expect_params(params, 0, name)?; one(gate::sx()) }
        "rx" => { expect_params(params, 1, name)?; one(gate::rx(params[0])) }
        "ry" => { expect_params(params, 1, name)?; one(gate::ry(params[0])) }
        "rz" => { expect_params(params, 1, name)?; one(gate::rz(params[0])) }
        "u1" => { expect_params(params, 1, name)?; one(gate::u1(params[0])) }
        "p" => { expect_params(params, 1, name)?; one(gate::p(params[0])) }
        "u2" => { expect_params(params, 2, name)?; one(gate::u2(params[0], params[1])) }
        "u3" => { expect_params(params, 3, name)?; one(gate::u3(params[0], params[1], params[2])) }
        "cx" => { expect_params(params, 0, name)?; controlled(gate::x()) }
        "cy" => { expect_params(params, 0, name)?; controlled(gate::y()) }
        "cz" => { expect_params(params, 0, name)?; controlled(gate::z()) }
        "ch" => { expect_params(params, 0, name)?; controlled(gate::h()) }
        "swap" => {
            expect_params(params, 0, name)?;
            expect_arity(args, 2, name)?;
            Ok(Instruction::Swap { a: args[0], b: args[1] })
        }
        "ccx" => {
            expect_params(params, 0, name)?;
            expect_arity(args, 3, name)?;
            Ok(Instruction::Toffoli { control0: args[0], control1: args[1], target: args[2] })
        }
        other => Err(format!("unsupported gate '{other}'")),
    }
}

fn expect_arity(args: &[usize], n: usize, gate: &str) -> Result<(), String> {
    if args.len() != n {
        return Err(format!("gate '{gate}' expects {n} qubit argument(s), got {}", args.len()));
    }
    let mut seen = args.to_vec();
    seen.sort_unstable();
    seen.dedup();
    if seen.len() != args.len() {
        return Err(format!("gate '{gate}' was applied with repeated qubit arguments"));
    }
    Ok(())
}

fn expect_params(params: &[f64], n: usize, gate: &str) -> Result<(), String> {
    if params.len() != n {
        return Err(format!("gate '{gate}' expects {n} parameter(s), got {}", params.len()));
    }
    Ok(())
}

/// Split `"gatename(p1,p2) q[0],q[1]"` / `"gatename q[0]"` into
/// `(name, params_src, args_src)`.
fn split_gate_application(text: &str) -> Result<(&str, &str, &str), String> {
    let text = text.trim();
    if let Some(paren_start) = text.find('(') {
        let name = text[..paren_start].trim();
        let paren_end = text[paren_start..]
            .find(')')
            .map(|i| i + paren_start)
            .ok_or_else(|| "unterminated '(' in gate parameters".to_string())?;
        let params_src = &text[paren_start + 1..paren_end];
        let args_src = text[paren_end + 1..].trim();
        if name.is_empty() || args_src.is_empty() {
            return Err(format!("malformed gate application: '{text}'"));
        }
        Ok((name, params_src, args_src))
    } else {
        let mut parts = text.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or("").trim();
        let args_src = parts.next().unwrap_or("").trim();
        if name.is_empty() || args_src.is_empty() {
            return Err(format!("malformed gate application: '{text}'"));
        }
        Ok((name, "", args_src))
    }
}

/// Parse `"name[size]"` into `(name, size)`.
fn parse_register_decl(text: &str) -> Result<(String, usize), String> {
    let text = text.trim();
    let open = text.find('[').ok_or("expected '[size]'")?;
    let close = text.find(']').ok_or("expected closing ']'")?;
    if close < open {
        return Err("malformed register declaration".into());
    }
    let name = text[..open].trim();
    if name.is_empty() {
        return Err("register declaration is missing a name".into());
    }
    let size: usize = text[open + 1..close]
        .trim()
        .parse()
        .map_err(|_| "register size must be a non-negative integer".to_string())?;
    Ok((name.to_string(), size))
}

/// Parse `"name[idx]"` against the declared quantum register.
fn parse_qubit_ref(text: &str, reg_name: &str, reg_size: usize) -> Result<usize, String> {
    let (name, idx) = parse_indexed_ref(text)?;
    if name != reg_name {
        return Err(format!("unknown qubit register '{name}'"));
    }
    if idx >= reg_size {
        return Err(format!("qubit index {idx} out of range for register '{name}[{reg_size}]'"));
    }
    Ok(idx)
}

/// Parse `"name[idx]"` against the declared classical register.
fn parse_classical_ref(text: &str, reg_name: &str, reg_size: usize) -> Result<usize, String> {
    let (name, idx) = parse_indexed_ref(text)?;
    if name != reg_name {
        return Err(format!("unknown classical register '{name}'"));
    }
    if idx >= reg_size {
        return Err(format!("classical index {idx} out of range for register '{name}[{reg_size}]'"));
    }
    Ok(idx)
}

fn parse_indexed_ref(text: &str) -> Result<(&str, usize), String> {
    let text = text.trim();
    let open = text.find('[').ok_or_else(|| format!("expected 'name[index]', got '{text}'"))?;
    let close = text.find(']').ok_or_else(|| format!("unterminated '[' in '{text}'"))?;
    let name = text[..open].trim();
    let idx: usize = text[open + 1..close]
        .trim()
        .parse()
        .map_err(|_| format!("index in '{text}' is not a non-negative integer"))?;
    Ok((name, idx))
}

/// Remove `//` line comments, preserving newline positions so downstream
/// line-number tracking stays accurate.
fn strip_comments(source: &str) -> String {
    source
        .lines()
        .map(|line| match line.find("//") {
            Some(i) => &line[..i],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Textually expand `cry(theta) a,b;` into the equivalent `ry`/`cx`
/// sequence (spec §4.1). Purely textual and idempotent: the output never
/// contains another `cry(` occurrence.
fn shim_cry(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    while i < source.len() {
        let rest = &source[i..];
        if rest.starts_with("cry") && is_identifier_boundary(source, i) {
            if let Some((theta, a, b, consumed)) = try_parse_cry(rest) {
                out.push_str(&format!(
                    "ry(({theta})/2) {b}; cx {a},{b}; ry(-({theta})/2) {b}; cx {a},{b};",
                    theta = theta,
                    a = a,
                    b = b
                ));
                i += consumed;
                continue;
            }
        }
        let ch = rest.chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

fn is_identifier_boundary(s: &str, i: usize) -> bool {
    if i == 0 {
        return true;
    }
    match s[..i].chars().next_back() {
        Some(c) => !(c.is_alphanumeric() || c == '_'),
        None => true,
    }
}

/// Try to parse a `cry(...) a,b;` application starting at byte 0 of `s`.
/// Returns `(theta_expr, qarg_a, qarg_b, bytes_consumed)`.
fn try_parse_cry(s: &str) -> Option<(String, String, String, usize)> {
    let after_name = s["cry".len()..].trim_start();
    let skipped = s.len() - after_name.len();
    let rest = after_name.strip_prefix('(')?;
    let close_rel = rest.find(')')?;
    let theta = rest[..close_rel].trim().to_string();
    let after_paren = &rest[close_rel + 1..];
    let semi_rel = after_paren.find(';')?;
    let args = after_paren[..semi_rel].trim();
    let (a, b) = args.split_once(',')?;

    let consumed = "cry".len() + skipped + 1 + close_rel + 1 + semi_rel + 1;
    Some((theta, a.trim().to_string(), b.trim().to_string(), consumed))
}

/// Split a shimmed, comment-free source into `;`-terminated statements,
/// tracking the originating line number of each for error reporting.
fn split_statements(source: &str) -> Vec<Statement<'_>> {
    let mut statements = Vec::new();
    let mut line = 1usize;
    let mut stmt_start_line = 1usize;
    let mut start = 0usize;
    let bytes = source.as_bytes();
    let mut seen_non_ws_since_start = false;

    for (idx, &b) in bytes.iter().enumerate() {
        if b == b'\n' {
            line += 1;
        }
        if !seen_non_ws_since_start && !(b as char).is_whitespace() {
            stmt_start_line = line;
            seen_non_ws_since_start = true;
        }
        if b == b';' {
            let text = source[start..idx].trim();
            if !text.is_empty() {
                statements.push(Statement { line: stmt_start_line, text });
            }
            start = idx + 1;
            seen_non_ws_since_start = false;
        }
    }
    let trailing = source[start..].trim();
    if !trailing.is_empty() {
        statements.push(Statement { line: stmt_start_line, text: trailing });
    }
    statements
}

/// A tiny recursive-descent evaluator for gate-parameter expressions:
/// decimal literals, `pi`, `+ - * /`, unary minus, and parentheses.
fn eval_expr(s: &str) -> Result<f64, String> {
    let mut p = ExprParser { chars: s.chars().collect(), pos: 0 };
    let v = p.expr()?;
    p.skip_ws();
    if p.pos != p.chars.len() {
        return Err(format!("trailing characters in expression '{s}'"));
    }
    Ok(v)
}

struct ExprParser {
    chars: Vec<char>,
    pos: usize,
}

impl ExprParser {
    fn skip_ws(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.get(self.pos).copied()
    }

    fn expr(&mut self) -> Result<f64, String> {
        let mut v = self.term()?;
        loop {
            match self.peek() {
                Some('+') => { self.pos += 1; v += self.term()?; }
                Some('-') => { self.pos += 1; v -= self.term()?; }
                _ => break,
            }
        }
        Ok(v)
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut v = self.factor()?;
        loop {
            match self.peek() {
                Some('*') => { self.pos += 1; v *= self.factor()?; }
                Some('/') => {
                    self.pos += 1;
                    let d = self.factor()?;
                    if d == 0.0 {
                        return Err("division by zero in gate parameter expression".into());
                    }
                    v /= d;
                }
                _ => break,
            }
        }
        Ok(v)
    }

    fn factor(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some('-') => { self.pos += 1; Ok(-self.factor()?) }
            Some('+') => { self.pos += 1; self.factor() }
            Some('(') => {
                self.pos += 1;
                let v = self.expr()?;
                match self.peek() {
                    Some(')') => { self.pos += 1; Ok(v) }
                    _ => Err("expected closing ')' in expression".into()),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) if c.is_alphabetic() => self.identifier(),
            other => Err(format!("unexpected token in expression: {:?}", other)),
        }
    }

    fn number(&mut self) -> Result<f64, String> {
        let start = self.pos;
        while self.pos < self.chars.len()
            && (self.chars[self.pos].is_ascii_digit() || self.chars[self.pos] == '.')
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>().map_err(|_| format!("invalid numeric literal '{text}'"))
    }

    fn identifier(&mut self) -> Result<f64, String> {
        let start = self.pos;
        while self.pos < self.chars.len() && self.chars[self.pos].is_alphanumeric() {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        match text.as_str() {
            "pi" => Ok(PI),
            other => Err(format!("unknown identifier '{other}' in expression")),
        }
    }
}
