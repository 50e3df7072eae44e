//! LaTeX reader
//!
//! Parses a LaTeX math fragment, the persisted form of a formula, back into a
//! [`MathData`] tree. Unknown control words are kept as `Unknown` nodes so
//! that foreign input degrades instead of failing; structural problems
//! (unbalanced braces, a mismatched `\end`, missing arguments, double
//! scripts) are reported as [`MathError::LatexParse`].

use crate::atom::MathAtom;
use crate::data::MathData;
use crate::deco;
use crate::error::{MathError, MathResult};
use crate::inset::{
    parse_col_spec, BoldSymbolInset, BoldSymbolKind, BoxInset, BoxKind, BraceInset, CancelInset,
    CancelKind, CancelToInset, ColorInset, DecorationInset, DelimInset, FontCommand, FontInset,
    FracInset, FracKind, GridInset, GridKind, InsetMath, LabelPos, RootInset, ScriptInset,
    SpaceKind, SqrtInset, SymbolInset, VAlign, XArrowInset, XArrowKind, XYArrowInset,
};
use crate::symbols;

/// Parse a LaTeX math fragment (without `$` delimiters)
pub fn parse_latex(input: &str) -> MathResult<MathData> {
    let mut parser = Parser::new(input);
    let data = parser.parse_top(Mode::Math)?;
    tracing::debug!(atoms = data.len(), "parsed LaTeX fragment");
    Ok(data)
}

/// Parse LaTeX text-mode content such as the argument of `\text`
pub fn parse_text(input: &str) -> MathResult<MathData> {
    Parser::new(input).parse_top(Mode::Text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Math,
    Text,
}

/// Token that ended a sequence of atoms
#[derive(Debug, Clone, PartialEq, Eq)]
enum Stop {
    Eof,
    Brace,
    Bracket,
    Cell,
    Row,
    End(String),
    Right(String),
    Dollar,
}

struct GridCell {
    content: MathData,
    span: Option<(usize, String)>,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    // =========================================================================
    // Cursor
    // =========================================================================

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn error(&self, message: impl Into<String>) -> MathError {
        MathError::parse(self.pos, message)
    }

    fn unexpected(&self, stop: &Stop) -> MathError {
        let message = match stop {
            Stop::Eof => "unexpected end of input".to_string(),
            Stop::Brace => "unmatched '}'".to_string(),
            Stop::Bracket => "unexpected ']'".to_string(),
            Stop::Cell => "'&' outside a grid".to_string(),
            Stop::Row => "'\\\\' outside a grid".to_string(),
            Stop::End(name) => format!("\\end{{{}}} without matching \\begin", name),
            Stop::Right(_) => "\\right without matching \\left".to_string(),
            Stop::Dollar => "unexpected '$'".to_string(),
        };
        self.error(message)
    }

    /// Whether the input continues with the control word `\name`
    fn at_command(&self, name: &str) -> bool {
        if self.peek() != Some('\\') {
            return false;
        }
        let start = self.pos + 1;
        let end = start + name.chars().count();
        end <= self.chars.len()
            && self.chars[start..end].iter().copied().eq(name.chars())
            && !self.chars.get(end).is_some_and(|c| c.is_ascii_alphabetic())
    }

    /// Name after a backslash; spaces after a control word are skipped
    fn read_command_name(&mut self) -> MathResult<String> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        if self.pos > start {
            let name: String = self.chars[start..self.pos].iter().collect();
            self.skip_ws();
            return Ok(name);
        }
        match self.bump() {
            Some('\n') | Some('\t') => Ok(" ".to_string()),
            Some(c) => Ok(c.to_string()),
            None => Err(self.error("trailing backslash")),
        }
    }

    // =========================================================================
    // Sequences and arguments
    // =========================================================================

    fn parse_top(&mut self, mode: Mode) -> MathResult<MathData> {
        let (data, stop) = self.parse_until(mode, false)?;
        match stop {
            Stop::Eof => Ok(data),
            other => Err(self.unexpected(&other)),
        }
    }

    /// Atoms up to the next stop token; `]` stops only inside optional arguments
    fn parse_until(&mut self, mode: Mode, bracket: bool) -> MathResult<(MathData, Stop)> {
        let mut cell = MathData::new();
        loop {
            if let Some(stop) = self.step(&mut cell, mode, bracket, false)? {
                return Ok((cell, stop));
            }
        }
    }

    /// Content of a `{...}` group whose opening brace was consumed
    fn parse_group(&mut self, mode: Mode) -> MathResult<MathData> {
        let (data, stop) = self.parse_until(mode, false)?;
        match stop {
            Stop::Brace => Ok(data),
            Stop::Eof => Err(self.error("missing '}'")),
            other => Err(self.unexpected(&other)),
        }
    }

    /// Mandatory argument: a group or a single token
    fn parse_arg(&mut self, mode: Mode, what: &str) -> MathResult<MathData> {
        self.skip_ws();
        match self.peek() {
            Some('{') => {
                self.bump();
                self.parse_group(mode)
            }
            None | Some('}') | Some('&') | Some('$') | Some('^') | Some('_') => {
                Err(self.error(format!("missing argument for {}", what)))
            }
            Some(_) => {
                let mut cell = MathData::new();
                match self.step(&mut cell, mode, false, true)? {
                    None if !cell.is_empty() => Ok(cell),
                    _ => Err(self.error(format!("missing argument for {}", what))),
                }
            }
        }
    }

    /// Optional `[...]` argument
    fn parse_opt(&mut self, mode: Mode) -> MathResult<Option<MathData>> {
        self.skip_ws();
        if !self.eat('[') {
            return Ok(None);
        }
        let (data, stop) = self.parse_until(mode, true)?;
        match stop {
            Stop::Bracket => Ok(Some(data)),
            Stop::Eof => Err(self.error("missing ']'")),
            other => Err(self.unexpected(&other)),
        }
    }

    /// Verbatim text between `open` and the matching `close`
    fn read_balanced(&mut self, open: char, close: char) -> MathResult<String> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            match self.bump() {
                None => return Err(self.error(format!("missing '{}'", close))),
                Some('{') => depth += 1,
                Some('}') if depth > 0 => depth -= 1,
                Some(c) if c == close && depth == 0 => break,
                Some(c) if c == open && open != '{' => depth += 1,
                Some(_) => {}
            }
        }
        Ok(self.chars[start..self.pos - 1].iter().collect())
    }

    /// Verbatim `{...}` argument, used for names, lengths and column specs
    fn parse_raw_arg(&mut self, what: &str) -> MathResult<String> {
        self.skip_ws();
        if !self.eat('{') {
            return Err(self.error(format!("missing argument for {}", what)));
        }
        self.read_balanced('{', '}')
    }

    fn parse_raw_opt(&mut self) -> MathResult<Option<String>> {
        self.skip_ws();
        if !self.eat('[') {
            return Ok(None);
        }
        self.read_balanced('[', ']').map(Some)
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Parse one token into `cell`; returns the stop token if one was read.
    /// With `single` a digit run is cut after the first digit, as TeX reads
    /// undelimited arguments.
    fn step(
        &mut self,
        cell: &mut MathData,
        mode: Mode,
        bracket: bool,
        single: bool,
    ) -> MathResult<Option<Stop>> {
        if mode == Mode::Math {
            self.skip_ws();
        }
        let Some(c) = self.peek() else {
            return Ok(Some(Stop::Eof));
        };
        match c {
            '}' => {
                self.bump();
                return Ok(Some(Stop::Brace));
            }
            ']' if bracket => {
                self.bump();
                return Ok(Some(Stop::Bracket));
            }
            '&' => {
                self.bump();
                return Ok(Some(Stop::Cell));
            }
            '$' => {
                self.bump();
                if mode == Mode::Math {
                    return Ok(Some(Stop::Dollar));
                }
                let (math, stop) = self.parse_until(Mode::Math, false)?;
                if stop != Stop::Dollar {
                    return Err(self.error("missing closing '$'"));
                }
                cell.append(math);
            }
            '{' => {
                self.bump();
                let group = self.parse_group(mode)?;
                cell.push(group_atom(group));
            }
            '\\' => {
                self.bump();
                return self.parse_command(cell, mode, bracket);
            }
            '%' => {
                self.bump();
                let start = self.pos;
                while self.peek().is_some_and(|c| c != '\n') {
                    self.pos += 1;
                }
                let text: String = self.chars[start..self.pos].iter().collect();
                self.eat('\n');
                cell.push(InsetMath::Comment(text));
            }
            '#' => {
                self.bump();
                match self.bump().and_then(|d| d.to_digit(10)) {
                    Some(n) => cell.push(InsetMath::MacroArg(n as u8)),
                    None => return Err(self.error("'#' without argument number")),
                }
            }
            '~' => {
                self.bump();
                cell.push(InsetMath::Space(SpaceKind::Nbsp));
            }
            _ if mode == Mode::Text => {
                self.bump();
                push_text(cell, c);
            }
            '^' | '_' => {
                self.bump();
                self.parse_script(cell, c == '^')?;
            }
            _ if c.is_ascii_digit() => {
                let number = self.read_number(single);
                cell.push(InsetMath::Number(number));
            }
            _ if symbols::is_symbol_char(c) => {
                self.bump();
                match SymbolInset::new(&c.to_string()) {
                    Some(symbol) => cell.push(InsetMath::Symbol(symbol)),
                    None => cell.push(InsetMath::Char(c)),
                }
            }
            _ => {
                self.bump();
                cell.push(InsetMath::Char(c));
            }
        }
        Ok(None)
    }

    /// Digits with at most one inner decimal point. Math mode spaces inside
    /// the run are dropped, so `12 34` is the single number `1234`.
    fn read_number(&mut self, single: bool) -> String {
        let mut number = String::new();
        if let Some(first) = self.bump() {
            number.push(first);
        }
        if single {
            return number;
        }
        let mut point = false;
        loop {
            if let Some(c) = self.peek().filter(char::is_ascii_digit) {
                number.push(c);
                self.pos += 1;
                continue;
            }
            let ahead = self.skip_ws_from(self.pos);
            match self.chars.get(ahead) {
                Some(c) if c.is_ascii_digit() => self.pos = ahead,
                Some('.') if !point => {
                    let after = self.skip_ws_from(ahead + 1);
                    if !self.chars.get(after).is_some_and(char::is_ascii_digit) {
                        break;
                    }
                    number.push('.');
                    point = true;
                    self.pos = after;
                }
                _ => break,
            }
        }
        number
    }

    /// First non-space position at or after `from`
    fn skip_ws_from(&self, from: usize) -> usize {
        let mut at = from;
        while self.chars.get(at).is_some_and(|c| c.is_whitespace()) {
            at += 1;
        }
        at
    }

    fn parse_script(&mut self, cell: &mut MathData, sup: bool) -> MathResult<()> {
        let what = if sup { "superscript" } else { "subscript" };
        let script = self.parse_arg(Mode::Math, what)?;
        if let Some(InsetMath::Scripts(scripts)) = cell.back_mut().map(MathAtom::nucleus_mut) {
            if (sup && scripts.has_sup()) || (!sup && scripts.has_sub()) {
                return Err(self.error(format!("double {}", what)));
            }
            if sup {
                scripts.set_sup(Some(script));
            } else {
                scripts.set_sub(Some(script));
            }
            return Ok(());
        }
        let mut scripts = ScriptInset::new(take_nucleus(cell));
        if sup {
            scripts.set_sup(Some(script));
        } else {
            scripts.set_sub(Some(script));
        }
        cell.push(InsetMath::Scripts(scripts));
        Ok(())
    }

    // =========================================================================
    // Commands
    // =========================================================================

    fn parse_command(
        &mut self,
        cell: &mut MathData,
        mode: Mode,
        bracket: bool,
    ) -> MathResult<Option<Stop>> {
        let name = self.read_command_name()?;
        match name.as_str() {
            "\\" => return Ok(Some(Stop::Row)),
            "end" => {
                let env = self.parse_raw_arg("\\end")?;
                return Ok(Some(Stop::End(env.trim().to_string())));
            }
            "right" => {
                let delim = self.parse_delim()?;
                return Ok(Some(Stop::Right(delim)));
            }
            "over" | "atop" | "choose" => {
                let kind = FracKind::from_name(&name).unwrap_or(FracKind::Over);
                let num = std::mem::take(cell);
                let (den, stop) = self.parse_until(mode, bracket)?;
                cell.push(InsetMath::Frac(FracInset::with_kind(kind, num, den)));
                return Ok(Some(stop));
            }
            "color" => {
                let color = self.parse_raw_arg("\\color")?;
                let (rest, stop) = self.parse_until(mode, bracket)?;
                cell.push(InsetMath::Color(ColorInset::new(color.trim(), true, rest)));
                return Ok(Some(stop));
            }
            "protect" => {}
            "{" | "}" | "%" | "&" | "#" | "$" | "_" => {
                let c = name.chars().next().unwrap_or('?');
                match mode {
                    Mode::Text => push_text(cell, c),
                    Mode::Math => cell.push(InsetMath::Char(c)),
                }
            }
            "textbackslash" | "textasciitilde" | "textasciicircum" if mode == Mode::Text => {
                if self.peek() == Some('{') && self.chars.get(self.pos + 1) == Some(&'}') {
                    self.pos += 2;
                }
                let c = match name.as_str() {
                    "textbackslash" => '\\',
                    "textasciitilde" => '~',
                    _ => '^',
                };
                push_text(cell, c);
            }
            "ensuremath" => {
                let math = self.parse_arg(Mode::Math, "\\ensuremath")?;
                cell.append(math);
            }
            "left" => {
                let left = self.parse_delim()?;
                let (inner, stop) = self.parse_until(Mode::Math, false)?;
                match stop {
                    Stop::Right(right) => {
                        cell.push(InsetMath::Delim(DelimInset::new(left, right, inner)))
                    }
                    Stop::Eof => return Err(self.error("missing \\right")),
                    other => return Err(self.unexpected(&other)),
                }
            }
            "begin" => {
                let env = self.parse_raw_arg("\\begin")?;
                let grid = self.parse_environment(env.trim())?;
                cell.push(InsetMath::Grid(grid));
            }
            "substack" | "xymatrix" => {
                let kind = if name == "substack" {
                    GridKind::Substack
                } else {
                    GridKind::XYMatrix
                };
                self.skip_ws();
                if !self.eat('{') {
                    return Err(self.error(format!("missing argument for \\{}", name)));
                }
                let grid = self.parse_grid(kind, None, None, VAlign::Center)?;
                cell.push(InsetMath::Grid(grid));
            }
            "limits" | "nolimits" => {
                let limits = name == "limits";
                if let Some(InsetMath::Scripts(scripts)) =
                    cell.back_mut().map(MathAtom::nucleus_mut)
                {
                    scripts.limits = Some(limits);
                    return Ok(None);
                }
                if cell.is_empty() {
                    return Err(self.error(format!("\\{} without an operator", name)));
                }
                let mut scripts = ScriptInset::new(take_nucleus(cell));
                scripts.limits = Some(limits);
                cell.push(InsetMath::Scripts(scripts));
            }
            "sqrt" => {
                let index = self.parse_opt(Mode::Math)?;
                let radicand = self.parse_arg(Mode::Math, "\\sqrt")?;
                cell.push(match index {
                    Some(index) => InsetMath::Root(RootInset::new(index, radicand)),
                    None => InsetMath::Sqrt(SqrtInset::new(radicand)),
                });
            }
            "textcolor" => {
                let color = self.parse_raw_arg("\\textcolor")?;
                let arg = self.parse_arg(mode, "\\textcolor")?;
                cell.push(InsetMath::Color(ColorInset::new(color.trim(), false, arg)));
            }
            "cancelto" => {
                let target = self.parse_arg(Mode::Math, "\\cancelto")?;
                let expr = self.parse_arg(Mode::Math, "\\cancelto")?;
                cell.push(InsetMath::CancelTo(CancelToInset::new(expr, target)));
            }
            "hspace" => {
                self.eat('*');
                let len = self.parse_raw_arg("\\hspace")?;
                cell.push(InsetMath::Space(SpaceKind::Hspace(len.trim().to_string())));
            }
            "ar" => {
                let arrow = self.parse_xyarrow()?;
                cell.push(InsetMath::XYArrow(arrow));
            }
            _ => {
                let inset = self.parse_generic(&name, mode)?;
                cell.push(inset);
            }
        }
        Ok(None)
    }

    /// Commands looked up in the node tables
    fn parse_generic(&mut self, name: &str, mode: Mode) -> MathResult<InsetMath> {
        let what = format!("\\{}", name);
        if let Some(kind) = FracKind::from_name(name) {
            let num = self.parse_arg(Mode::Math, &what)?;
            let den = self.parse_arg(Mode::Math, &what)?;
            return Ok(InsetMath::Frac(FracInset::with_kind(kind, num, den)));
        }
        if deco::decoration(name).is_some() {
            let arg = self.parse_arg(Mode::Math, &what)?;
            return DecorationInset::new(name, arg)
                .map(InsetMath::Decoration)
                .ok_or_else(|| self.error(format!("unknown decoration {}", what)));
        }
        if let Some(mut kind) = BoxKind::from_name(name) {
            if let BoxKind::Makebox { width, pos } | BoxKind::Framebox { width, pos } = &mut kind {
                if let Some(w) = self.parse_raw_opt()? {
                    *width = w;
                    if let Some(p) = self.parse_raw_opt()? {
                        *pos = p;
                    }
                }
            }
            let arg_mode = if kind.is_text_mode() {
                Mode::Text
            } else {
                Mode::Math
            };
            let arg = self.parse_arg(arg_mode, &what)?;
            return Ok(InsetMath::Box(BoxInset::new(kind, arg)));
        }
        if let Some(command) = FontCommand::from_name(name) {
            let arg_mode = if command.is_text_mode() {
                Mode::Text
            } else {
                Mode::Math
            };
            let arg = self.parse_arg(arg_mode, &what)?;
            return Ok(InsetMath::Font(FontInset::new(command, arg)));
        }
        if let Some(kind) = BoldSymbolKind::from_name(name) {
            let arg = self.parse_arg(Mode::Math, &what)?;
            return Ok(InsetMath::BoldSymbol(BoldSymbolInset::new(kind, arg)));
        }
        if let Some(kind) = CancelKind::from_name(name) {
            let arg = self.parse_arg(Mode::Math, &what)?;
            return Ok(InsetMath::Cancel(CancelInset::new(kind, arg)));
        }
        if let Some(kind) = XArrowKind::from_name(name) {
            let below = self.parse_opt(Mode::Math)?.unwrap_or_default();
            let above = self.parse_arg(Mode::Math, &what)?;
            return Ok(InsetMath::XArrow(XArrowInset::new(kind, above, below)));
        }
        if let Some(space) = SpaceKind::from_command(name) {
            return Ok(InsetMath::Space(space));
        }
        if let Some(symbol) = symbols::lookup(name)
            .filter(|info| info.is_command())
            .and_then(|_| SymbolInset::new(name))
        {
            return Ok(InsetMath::Symbol(symbol));
        }
        if mode == Mode::Text {
            tracing::debug!(command = name, "unknown command in text mode");
        }
        Ok(InsetMath::Unknown(name.to_string()))
    }

    /// Delimiter after `\left` or `\right`
    fn parse_delim(&mut self) -> MathResult<String> {
        self.skip_ws();
        let delim = match self.bump() {
            Some('\\') => format!("\\{}", self.read_command_name()?),
            Some(c) => c.to_string(),
            None => return Err(self.error("missing delimiter")),
        };
        if !DelimInset::is_delimiter(&delim) {
            return Err(self.error(format!("invalid delimiter {}", delim)));
        }
        Ok(delim)
    }

    /// `\ar[dir]` with an optional `^`, `_` or `|` label
    fn parse_xyarrow(&mut self) -> MathResult<XYArrowInset> {
        let dir = self.parse_raw_opt()?.unwrap_or_default();
        self.skip_ws();
        let label_pos = self.peek().and_then(LabelPos::from_char);
        let label = match label_pos {
            Some(_) => {
                self.bump();
                self.parse_arg(Mode::Math, "\\ar label")?
            }
            None => MathData::new(),
        };
        Ok(XYArrowInset::new(dir.trim(), label_pos, label))
    }

    // =========================================================================
    // Grids
    // =========================================================================

    fn parse_environment(&mut self, env: &str) -> MathResult<GridInset> {
        let kind = GridKind::from_env(env)
            .ok_or_else(|| self.error(format!("unknown environment {}", env)))?;
        let mut v_align = VAlign::Center;
        let mut spec = None;
        if kind.has_col_spec() {
            if let Some(v) = self.parse_raw_opt()? {
                v_align = v
                    .trim()
                    .chars()
                    .next()
                    .and_then(VAlign::from_char)
                    .unwrap_or_default();
            }
            spec = Some(self.parse_raw_arg("column specification")?);
        }
        self.parse_grid(kind, Some(env), spec.as_deref(), v_align)
    }

    /// Rows of a grid up to `\end{env}`, or up to `}` for the command forms
    fn parse_grid(
        &mut self,
        kind: GridKind,
        end: Option<&str>,
        spec: Option<&str>,
        v_align: VAlign,
    ) -> MathResult<GridInset> {
        let mode = if kind.is_text_mode() {
            Mode::Text
        } else {
            Mode::Math
        };
        let mut rows: Vec<Vec<GridCell>> = Vec::new();
        let mut lines: Vec<usize> = Vec::new();

        loop {
            lines.push(self.count_hlines());
            let mut row = Vec::new();
            let finished = loop {
                self.skip_ws();
                let span = if self.at_command("multicolumn") {
                    Some(self.parse_multicolumn(mode)?)
                } else {
                    None
                };
                let (mut content, stop) = self.parse_until(mode, false)?;
                if mode == Mode::Text {
                    trim_trailing_text(&mut content);
                }
                row.push(match span {
                    Some((n, spec, mut head)) => {
                        head.append(content);
                        GridCell {
                            content: head,
                            span: Some((n, spec)),
                        }
                    }
                    None => GridCell {
                        content,
                        span: None,
                    },
                });
                match stop {
                    Stop::Cell => {}
                    Stop::Row => break false,
                    Stop::End(name) if end == Some(name.as_str()) => break true,
                    Stop::Brace if end.is_none() => break true,
                    Stop::End(name) => {
                        return Err(self.error(format!(
                            "\\end{{{}}} does not match \\begin{{{}}}",
                            name,
                            end.unwrap_or(kind.name())
                        )))
                    }
                    Stop::Eof => {
                        return Err(self.error(match end {
                            Some(env) => format!("missing \\end{{{}}}", env),
                            None => "missing '}'".to_string(),
                        }))
                    }
                    other => return Err(self.unexpected(&other)),
                }
            };
            rows.push(row);
            if finished {
                break;
            }
        }

        // `a \\ b \\` ends with an empty row that LaTeX does not show
        let trailing_empty = rows.len() > 1
            && matches!(rows.last().map(Vec::as_slice), Some([only]) if only.span.is_none() && only.content.is_empty());
        if trailing_empty {
            rows.pop();
        } else {
            lines.push(0);
        }

        let mut ncols = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.span.as_ref().map_or(1, |(n, _)| *n))
                    .sum::<usize>()
            })
            .max()
            .unwrap_or(1);
        if let Some(spec) = spec {
            let cols = parse_col_spec(spec).map_err(|e| self.error(e.to_string()))?;
            ncols = ncols.max(cols.len() - 1);
        }

        let mut grid = GridInset::new(kind, rows.len(), ncols);
        if let Some(spec) = spec {
            grid.set_col_spec(spec)
                .map_err(|e| self.error(e.to_string()))?;
        }
        grid.set_valign(v_align);
        for (r, row) in rows.into_iter().enumerate() {
            let mut c = 0;
            for cell in row {
                match cell.span {
                    Some((span, spec)) => {
                        grid.multicolumn(r, c, span, &spec, cell.content)
                            .map_err(|e| self.error(e.to_string()))?;
                        c += span;
                    }
                    None => {
                        if let Some(slot) = grid.cell_mut(r, c) {
                            *slot = cell.content;
                        }
                        c += 1;
                    }
                }
            }
        }
        for (r, n) in lines.into_iter().enumerate() {
            if n > 0 {
                grid.set_row_lines(r, n)?;
            }
        }
        Ok(grid)
    }

    fn count_hlines(&mut self) -> usize {
        let mut n = 0;
        loop {
            self.skip_ws();
            if !self.at_command("hline") {
                return n;
            }
            self.pos += "\\hline".len();
            n += 1;
        }
    }

    /// `\multicolumn{n}{spec}{content}` at the start of a cell
    fn parse_multicolumn(&mut self, mode: Mode) -> MathResult<(usize, String, MathData)> {
        self.pos += "\\multicolumn".len();
        let count = self.parse_raw_arg("\\multicolumn")?;
        let span = count
            .trim()
            .parse::<usize>()
            .map_err(|_| self.error(format!("invalid column count '{}'", count)))?;
        let spec = self.parse_raw_arg("\\multicolumn")?;
        let content = self.parse_arg(mode, "\\multicolumn")?;
        Ok((span, spec.trim().to_string(), content))
    }
}

/// Atom for a `{...}` group. Groups that hold only an infix fraction or an
/// old-style colour change are the written form of those nodes.
fn group_atom(group: MathData) -> InsetMath {
    let mut atoms = group.into_atoms();
    let unwrap = match atoms.as_slice() {
        [only] => match only.nucleus() {
            InsetMath::Frac(f) => f.kind.is_infix(),
            InsetMath::Color(c) => c.old_style,
            _ => false,
        },
        _ => false,
    };
    if unwrap {
        if let Some(atom) = atoms.pop() {
            return atom.into_inner();
        }
    }
    InsetMath::Brace(BraceInset::new(MathData::from_atoms(atoms)))
}

/// Remove the last atom as a script nucleus; a brace group gives its content
fn take_nucleus(cell: &mut MathData) -> MathData {
    match cell.pop_back().map(MathAtom::into_inner) {
        Some(InsetMath::Brace(brace)) => brace.into_cell(),
        Some(other) => MathData::from_atoms(vec![MathAtom::new(other)]),
        None => MathData::new(),
    }
}

fn push_text(cell: &mut MathData, c: char) {
    if let Some(InsetMath::Text(text)) = cell.back_mut().map(MathAtom::nucleus_mut) {
        text.push(c);
        return;
    }
    cell.push(InsetMath::Text(c.to_string()));
}

fn trim_trailing_text(cell: &mut MathData) {
    let now_empty = match cell.back_mut().map(MathAtom::nucleus_mut) {
        Some(InsetMath::Text(text)) => {
            let trimmed = text.trim_end().len();
            text.truncate(trimmed);
            text.is_empty()
        }
        _ => false,
    };
    if now_empty {
        cell.pop_back();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inset::{CellSpan, HAlign};

    fn only(data: &MathData) -> &InsetMath {
        assert_eq!(data.len(), 1, "expected one atom in {:?}", data);
        data.atoms()[0].nucleus()
    }

    #[test]
    fn test_frac_of_numbers() {
        let data = parse_latex("\\frac{1}{2}").unwrap();
        match only(&data) {
            InsetMath::Frac(f) => {
                assert_eq!(f.kind, FracKind::Frac);
                assert_eq!(only(f.num()), &InsetMath::Number("1".into()));
                assert_eq!(only(f.den()), &InsetMath::Number("2".into()));
            }
            other => panic!("not a fraction: {:?}", other),
        }
    }

    #[test]
    fn test_numbers_and_symbols() {
        let data = parse_latex("3.14+x.5").unwrap();
        let kinds: Vec<_> = data.iter().map(|a| a.kind_name()).collect();
        assert_eq!(kinds, ["number", "symbol", "char", "char", "number"]);
        assert_eq!(data.atoms()[0].nucleus(), &InsetMath::Number("3.14".into()));
    }

    #[test]
    fn test_spaces_inside_numbers_are_dropped() {
        for (src, digits) in [
            ("12 34", "1234"),
            ("1 2", "12"),
            ("1. 5", "1.5"),
            ("3 .1 4", "3.14"),
        ] {
            let data = parse_latex(src).unwrap();
            assert_eq!(only(&data), &InsetMath::Number(digits.into()), "{}", src);
        }

        let data = parse_latex("1.5 .2").unwrap();
        let kinds: Vec<_> = data.iter().map(|a| a.kind_name()).collect();
        assert_eq!(kinds, ["number", "char", "number"]);

        let data = parse_latex("2 x 3").unwrap();
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_single_token_arguments() {
        let data = parse_latex("\\frac12").unwrap();
        let InsetMath::Frac(f) = only(&data) else {
            panic!("not a fraction");
        };
        assert_eq!(only(f.num()), &InsetMath::Number("1".into()));
        assert_eq!(only(f.den()), &InsetMath::Number("2".into()));

        let data = parse_latex("x^23").unwrap();
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_root_with_index() {
        let data = parse_latex("\\sqrt[3]{x}").unwrap();
        let InsetMath::Root(root) = only(&data) else {
            panic!("not a root");
        };
        assert_eq!(only(root.index()), &InsetMath::Number("3".into()));
        assert_eq!(only(root.radicand()), &InsetMath::Char('x'));
    }

    #[test]
    fn test_scripts_attach_to_previous_atom() {
        let data = parse_latex("x_i^2").unwrap();
        let InsetMath::Scripts(s) = only(&data) else {
            panic!("not scripts");
        };
        assert_eq!(only(s.nucleus()), &InsetMath::Char('x'));
        assert!(s.has_sub() && s.has_sup());

        let data = parse_latex("{ab}^2").unwrap();
        let InsetMath::Scripts(s) = only(&data) else {
            panic!("not scripts");
        };
        assert_eq!(s.nucleus().len(), 2);

        let data = parse_latex("^2").unwrap();
        let InsetMath::Scripts(s) = only(&data) else {
            panic!("not scripts");
        };
        assert!(s.nucleus().is_empty());
    }

    #[test]
    fn test_double_script_is_error() {
        let err = parse_latex("x^2^3").unwrap_err();
        assert!(err.to_string().contains("double superscript"));
        assert!(parse_latex("x_1_2").is_err());
    }

    #[test]
    fn test_limits() {
        let data = parse_latex("\\sum\\limits_{i=1}^n").unwrap();
        let InsetMath::Scripts(s) = only(&data) else {
            panic!("not scripts");
        };
        assert_eq!(s.limits, Some(true));
        assert!(s.has_sub() && s.has_sup());
    }

    #[test]
    fn test_brace_errors() {
        assert!(matches!(
            parse_latex("\\frac{1}{2"),
            Err(MathError::LatexParse { .. })
        ));
        assert!(parse_latex("a}").is_err());
        assert!(parse_latex("\\frac{1}").is_err());
        assert!(parse_latex("\\sqrt").is_err());
    }

    #[test]
    fn test_infix_fraction_and_old_color_unwrap() {
        let data = parse_latex("{a \\over b}").unwrap();
        let InsetMath::Frac(f) = only(&data) else {
            panic!("not a fraction");
        };
        assert_eq!(f.kind, FracKind::Over);

        let data = parse_latex("{\\color{red}x}").unwrap();
        let InsetMath::Color(c) = only(&data) else {
            panic!("not a colour");
        };
        assert!(c.old_style);
        assert_eq!(c.color, "red");

        let data = parse_latex("\\textcolor{blue}{y}").unwrap();
        let InsetMath::Color(c) = only(&data) else {
            panic!("not a colour");
        };
        assert!(!c.old_style);

        let data = parse_latex("{xy}").unwrap();
        assert!(matches!(only(&data), InsetMath::Brace(_)));
    }

    #[test]
    fn test_cases_environment() {
        let data = parse_latex("\\begin{cases}a&b\\\\c&d\\end{cases}").unwrap();
        let InsetMath::Grid(g) = only(&data) else {
            panic!("not a grid");
        };
        assert_eq!(g.kind, GridKind::Cases);
        assert_eq!((g.nrows(), g.ncols()), (2, 2));
        assert_eq!(only(g.cell(1, 0).unwrap()), &InsetMath::Char('c'));
    }

    #[test]
    fn test_mismatched_end() {
        let err = parse_latex("\\begin{pmatrix}a\\end{bmatrix}").unwrap_err();
        assert!(err.to_string().contains("does not match"));
        assert!(parse_latex("\\begin{matrix}a").is_err());
        assert!(parse_latex("a\\end{matrix}").is_err());
    }

    #[test]
    fn test_array_spec_lines_and_multicolumn() {
        let src = "\\begin{array}[t]{|l|c|}\\hline \\multicolumn{2}{|c|}{x}\\\\ a&b\\\\ \\hline\\end{array}";
        let data = parse_latex(src).unwrap();
        let InsetMath::Grid(g) = only(&data) else {
            panic!("not a grid");
        };
        assert_eq!((g.nrows(), g.ncols()), (2, 2));
        assert_eq!(g.v_align, VAlign::Top);
        assert_eq!(g.col_info(0).unwrap().align, HAlign::Left);
        assert_eq!(g.col_spec(), "|l|c|");
        assert_eq!(g.row_info(0).unwrap().lines, 1);
        assert_eq!(g.row_info(2).unwrap().lines, 1);
        assert!(matches!(
            g.cell_span(0, 0),
            Some(CellSpan::Begin { span: 2, .. })
        ));
        assert_eq!(g.cell_span(0, 1), Some(&CellSpan::Part));
    }

    #[test]
    fn test_trailing_row_separator() {
        let data = parse_latex("\\begin{matrix}a\\\\b\\\\\\end{matrix}").unwrap();
        let InsetMath::Grid(g) = only(&data) else {
            panic!("not a grid");
        };
        assert_eq!(g.nrows(), 2);
    }

    #[test]
    fn test_substack_and_xymatrix() {
        let data = parse_latex("\\sum_{\\substack{i<n\\\\j<m}}").unwrap();
        let InsetMath::Scripts(s) = only(&data) else {
            panic!("not scripts");
        };
        let InsetMath::Grid(g) = only(s.sub().unwrap()) else {
            panic!("not a substack");
        };
        assert_eq!(g.kind, GridKind::Substack);
        assert_eq!(g.nrows(), 2);

        let data = parse_latex("\\xymatrix{A \\ar[r]^{f} & B}").unwrap();
        let InsetMath::Grid(g) = only(&data) else {
            panic!("not a diagram");
        };
        assert_eq!(g.kind, GridKind::XYMatrix);
        let first = g.cell(0, 0).unwrap();
        match first.atoms()[1].nucleus() {
            InsetMath::XYArrow(a) => {
                assert_eq!(a.dir, "r");
                assert_eq!(a.label_pos, Some(LabelPos::Above));
            }
            other => panic!("not an arrow: {:?}", other),
        }
    }

    #[test]
    fn test_text_mode_switching() {
        let data = parse_latex("\\text{if $x>0$ then}").unwrap();
        let InsetMath::Font(f) = only(&data) else {
            panic!("not a font inset");
        };
        let kinds: Vec<_> = f.cell().iter().map(|a| a.kind_name()).collect();
        assert_eq!(kinds, ["text", "char", "symbol", "number", "text"]);
        assert_eq!(f.cell().atoms()[0].nucleus(), &InsetMath::Text("if ".into()));

        let data = parse_latex("\\mbox{a\\ensuremath{\\alpha}}").unwrap();
        let InsetMath::Box(b) = only(&data) else {
            panic!("not a box");
        };
        assert!(matches!(b.cell().atoms()[1].nucleus(), InsetMath::Symbol(_)));
    }

    #[test]
    fn test_delims() {
        let data = parse_latex("\\left\\langle x \\right.").unwrap();
        let InsetMath::Delim(d) = only(&data) else {
            panic!("not a delimiter");
        };
        assert_eq!(d.left, "\\langle");
        assert_eq!(d.right, ".");
        assert!(parse_latex("\\left( x").is_err());
        assert!(parse_latex("x \\right)").is_err());
        assert!(parse_latex("\\left@ x\\right)").is_err());
    }

    #[test]
    fn test_unknown_comment_macro_arg() {
        let data = parse_latex("\\foo #1 % note\nx").unwrap();
        let atoms: Vec<_> = data.iter().map(|a| a.nucleus().clone()).collect();
        assert_eq!(
            atoms,
            vec![
                InsetMath::Unknown("foo".into()),
                InsetMath::MacroArg(1),
                InsetMath::Comment(" note".into()),
                InsetMath::Char('x'),
            ]
        );
    }

    #[test]
    fn test_spaces_boxes_arrows() {
        let data = parse_latex("a\\,b\\quad c\\hspace{1em}").unwrap();
        let spaces: Vec<_> = data
            .iter()
            .filter_map(|a| match a.nucleus() {
                InsetMath::Space(s) => Some(s.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            spaces,
            vec![
                SpaceKind::Thin,
                SpaceKind::Quad,
                SpaceKind::Hspace("1em".into())
            ]
        );

        let data = parse_latex("\\makebox[2cm][l]{hi}").unwrap();
        let InsetMath::Box(b) = only(&data) else {
            panic!("not a box");
        };
        assert_eq!(b.kind.optional_args(), Some(("2cm", "l")));

        let data = parse_latex("\\xrightarrow[u]{f}").unwrap();
        let InsetMath::XArrow(a) = only(&data) else {
            panic!("not an arrow");
        };
        assert_eq!(only(a.above()), &InsetMath::Char('f'));
        assert_eq!(only(a.below()), &InsetMath::Char('u'));
    }

    #[test]
    fn test_error_position() {
        match parse_latex("ab}") {
            Err(MathError::LatexParse { position, .. }) => assert_eq!(position, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
