//! Turtle graph codec
//!
//! Writes and reads the provenance graph as a constrained Turtle subset:
//! PROV-O for the activity/entity structure, Dublin Core terms for the
//! descriptive metadata, `dcat:downloadURL` for retrieval locations. The
//! parser accepts exactly the statements the writer emits; this codec stages
//! records, it does not interoperate with arbitrary RDF.
//!
//! Output is deterministic: fixed prefix block, activity first, then used
//! and generated entities in URI order. Byte-stable output is what makes
//! finalization retries indistinguishable from a single run.

use chrono::{DateTime, SecondsFormat, Utc};
use url::Url;

use crate::activity::ActivityRecord;
use crate::entity::EntityRecord;
use crate::entity_set::EntitySet;
use crate::graph::{CodecError, GraphCodec, ProvenanceGraph};

const PREFIXES: &str = "\
@prefix prov: <http://www.w3.org/ns/prov#> .
@prefix dcterms: <http://purl.org/dc/terms/> .
@prefix dcat: <http://www.w3.org/ns/dcat#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
";

/// Turtle implementation of [`GraphCodec`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TurtleCodec;

impl TurtleCodec {
    /// Create a new codec
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn activity_statements(activity: &ActivityRecord) -> Vec<String> {
        let mut stmts = Vec::new();
        if let Some(title) = &activity.title {
            stmts.push(format!("dcterms:title \"{}\"", escape_literal(title)));
        }
        if let Some(description) = &activity.description {
            stmts.push(format!(
                "dcterms:description \"{}\"",
                escape_literal(description)
            ));
        }
        if let Some(attributed_to) = &activity.attributed_to {
            stmts.push(format!(
                "prov:wasAttributedTo \"{}\"",
                escape_literal(attributed_to)
            ));
        }
        if let Some(started_at) = activity.started_at {
            stmts.push(format!(
                "prov:startedAtTime \"{}\"^^xsd:dateTime",
                fmt_time(started_at)
            ));
        }
        if let Some(ended_at) = activity.ended_at {
            stmts.push(format!(
                "prov:endedAtTime \"{}\"^^xsd:dateTime",
                fmt_time(ended_at)
            ));
        }
        for uri in activity.used.uris() {
            stmts.push(format!("prov:used <{uri}>"));
        }
        for uri in activity.generated.uris() {
            stmts.push(format!("prov:generated <{uri}>"));
        }
        stmts
    }

    fn entity_statements(entity: &EntityRecord) -> Vec<String> {
        let mut stmts = Vec::new();
        if let Some(title) = &entity.title {
            stmts.push(format!("dcterms:title \"{}\"", escape_literal(title)));
        }
        if let Some(description) = &entity.description {
            stmts.push(format!(
                "dcterms:description \"{}\"",
                escape_literal(description)
            ));
        }
        if let Some(attributed_to) = &entity.attributed_to {
            stmts.push(format!(
                "prov:wasAttributedTo \"{}\"",
                escape_literal(attributed_to)
            ));
        }
        if let Some(created) = entity.created {
            stmts.push(format!(
                "dcterms:created \"{}\"^^xsd:dateTime",
                fmt_time(created)
            ));
        }
        if let Some(rights) = &entity.rights {
            stmts.push(format!("dcterms:rights \"{}\"", escape_literal(rights)));
        }
        if let Some(download_url) = &entity.download_url {
            stmts.push(format!(
                "dcat:downloadURL \"{download_url}\"^^xsd:anyURI"
            ));
        }
        stmts
    }

    fn write_block(out: &mut String, subject: &Url, rdf_type: &str, stmts: &[String]) {
        if stmts.is_empty() {
            out.push_str(&format!("<{subject}> a {rdf_type} .\n"));
            return;
        }
        out.push_str(&format!("<{subject}> a {rdf_type} ;\n"));
        for (i, stmt) in stmts.iter().enumerate() {
            let terminator = if i + 1 == stmts.len() { '.' } else { ';' };
            out.push_str(&format!("    {stmt} {terminator}\n"));
        }
    }
}

impl GraphCodec for TurtleCodec {
    fn serialize(&self, graph: &ProvenanceGraph) -> Result<String, CodecError> {
        let activity = graph.activity();
        let mut out = String::from(PREFIXES);

        out.push('\n');
        Self::write_block(
            &mut out,
            activity.uri(),
            "prov:Activity",
            &Self::activity_statements(activity),
        );

        for entity in activity.used.iter() {
            out.push('\n');
            Self::write_block(
                &mut out,
                entity.uri(),
                "prov:Entity",
                &Self::entity_statements(entity),
            );
        }
        for entity in activity.generated.iter() {
            // A used entity can never reappear as generated, but don't let a
            // malformed record produce a duplicate subject block.
            if activity.used.contains_uri(entity.uri()) {
                continue;
            }
            out.push('\n');
            Self::write_block(
                &mut out,
                entity.uri(),
                "prov:Entity",
                &Self::entity_statements(entity),
            );
        }

        Ok(out)
    }

    fn parse(&self, text: &str, expected_activity: &Url) -> Result<ProvenanceGraph, CodecError> {
        let mut parser = Parser::new(text);
        let document = parser.parse_document()?;

        let Some(activity_block) = document.activity else {
            return Err(CodecError::MissingActivity);
        };
        if activity_block.subject != *expected_activity {
            return Err(CodecError::ActivityMismatch {
                expected: Box::new(expected_activity.clone()),
                found: Box::new(activity_block.subject),
            });
        }

        let mut activity = ActivityRecord::new(activity_block.subject.clone());
        activity.title = activity_block.title;
        activity.description = activity_block.description;
        activity.attributed_to = activity_block.attributed_to;
        activity.started_at = activity_block.started_at;
        activity.ended_at = activity_block.ended_at;
        activity.used = resolve_entities(&activity_block.used, &document.entities);
        activity.generated = resolve_entities(&activity_block.generated, &document.entities);

        Ok(ProvenanceGraph::new(activity))
    }
}

/// Attach parsed entity blocks to the URIs an activity references. A URI
/// with no block of its own becomes a bare entity.
fn resolve_entities(uris: &[Url], entities: &[EntityRecord]) -> EntitySet {
    uris.iter()
        .map(|uri| {
            entities
                .iter()
                .find(|e| e.uri() == uri)
                .cloned()
                .unwrap_or_else(|| EntityRecord::new(uri.clone()))
        })
        .collect()
}

#[derive(Debug)]
struct ActivityBlock {
    subject: Url,
    title: Option<String>,
    description: Option<String>,
    attributed_to: Option<String>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    used: Vec<Url>,
    generated: Vec<Url>,
}

impl ActivityBlock {
    fn new(subject: Url) -> Self {
        Self {
            subject,
            title: None,
            description: None,
            attributed_to: None,
            started_at: None,
            ended_at: None,
            used: Vec::new(),
            generated: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Document {
    activity: Option<ActivityBlock>,
    entities: Vec<EntityRecord>,
}

/// One parsed predicate-object statement
enum Object {
    Resource(Url),
    Literal(String),
    Timestamp(DateTime<Utc>),
    AnyUri(Url),
}

struct Parser<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }

    fn parse_document(&mut self) -> Result<Document, CodecError> {
        let mut document = Document {
            activity: None,
            entities: Vec::new(),
        };

        while let Some((index, raw)) = self.lines.next() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with("@prefix") || line.starts_with('#') {
                continue;
            }
            if !line.starts_with('<') {
                return Err(malformed(index, "expected subject line"));
            }

            let (subject, rdf_type, closed) = parse_subject_line(line, index)?;
            let statements = if closed {
                Vec::new()
            } else {
                self.parse_statement_lines(index)?
            };

            match rdf_type {
                SubjectType::Activity => {
                    if document.activity.is_some() {
                        return Err(malformed(index, "more than one activity"));
                    }
                    document.activity = Some(build_activity(subject, statements)?);
                }
                SubjectType::Entity => {
                    document.entities.push(build_entity(subject, statements)?);
                }
            }
        }

        Ok(document)
    }

    /// Consume indented statement lines until one terminates with `.`
    fn parse_statement_lines(
        &mut self,
        block_line: usize,
    ) -> Result<Vec<(usize, String, Object)>, CodecError> {
        let mut statements = Vec::new();
        loop {
            let Some((index, raw)) = self.lines.next() else {
                return Err(malformed(block_line, "unterminated block"));
            };
            let line = raw.trim();
            if line.is_empty() {
                return Err(malformed(block_line, "unterminated block"));
            }
            let (body, last) = match line.strip_suffix('.') {
                Some(body) => (body.trim_end(), true),
                None => match line.strip_suffix(';') {
                    Some(body) => (body.trim_end(), false),
                    None => return Err(malformed(index, "statement missing terminator")),
                },
            };

            let Some((predicate, object_text)) = body.split_once(' ') else {
                return Err(malformed(index, "statement missing object"));
            };
            let object = parse_object(object_text.trim(), index)?;
            statements.push((index, predicate.to_string(), object));

            if last {
                return Ok(statements);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SubjectType {
    Activity,
    Entity,
}

fn parse_subject_line(line: &str, index: usize) -> Result<(Url, SubjectType, bool), CodecError> {
    let (body, closed) = match line.strip_suffix('.') {
        Some(body) => (body.trim_end(), true),
        None => match line.strip_suffix(';') {
            Some(body) => (body.trim_end(), false),
            None => return Err(malformed(index, "subject line missing terminator")),
        },
    };

    let Some(end) = body.find('>') else {
        return Err(malformed(index, "unclosed subject uri"));
    };
    let uri_text = &body[1..end];
    let subject = Url::parse(uri_text).map_err(|source| CodecError::InvalidUri {
        uri: uri_text.to_string(),
        source,
    })?;

    let rdf_type = match body[end + 1..].trim() {
        "a prov:Activity" => SubjectType::Activity,
        "a prov:Entity" => SubjectType::Entity,
        other => {
            return Err(malformed(
                index,
                format!("unrecognized subject type `{other}`"),
            ))
        }
    };

    Ok((subject, rdf_type, closed))
}

fn parse_object(text: &str, index: usize) -> Result<Object, CodecError> {
    if let Some(rest) = text.strip_prefix('<') {
        let Some(uri_text) = rest.strip_suffix('>') else {
            return Err(malformed(index, "unclosed resource uri"));
        };
        let uri = Url::parse(uri_text).map_err(|source| CodecError::InvalidUri {
            uri: uri_text.to_string(),
            source,
        })?;
        return Ok(Object::Resource(uri));
    }

    if !text.starts_with('"') {
        return Err(malformed(index, "expected literal or resource object"));
    }
    let (value, rest) = take_literal(&text[1..], index)?;
    match rest {
        "" => Ok(Object::Literal(value)),
        "^^xsd:dateTime" => {
            let parsed =
                DateTime::parse_from_rfc3339(&value).map_err(|source| CodecError::InvalidTimestamp {
                    value: value.clone(),
                    source,
                })?;
            Ok(Object::Timestamp(parsed.with_timezone(&Utc)))
        }
        "^^xsd:anyURI" => {
            let uri = Url::parse(&value).map_err(|source| CodecError::InvalidUri {
                uri: value.clone(),
                source,
            })?;
            Ok(Object::AnyUri(uri))
        }
        other => Err(malformed(
            index,
            format!("unrecognized literal datatype `{other}`"),
        )),
    }
}

/// Read an escaped literal body up to its closing quote. Returns the
/// unescaped value and whatever follows the quote.
fn take_literal<'a>(text: &'a str, index: usize) -> Result<(String, &'a str), CodecError> {
    let mut value = String::new();
    let mut chars = text.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((value, &text[i + 1..])),
            '\\' => match chars.next() {
                Some((_, '\\')) => value.push('\\'),
                Some((_, '"')) => value.push('"'),
                Some((_, 'n')) => value.push('\n'),
                Some((_, 'r')) => value.push('\r'),
                Some((_, 't')) => value.push('\t'),
                _ => return Err(malformed(index, "invalid escape in literal")),
            },
            other => value.push(other),
        }
    }
    Err(malformed(index, "unterminated literal"))
}

fn build_activity(
    subject: Url,
    statements: Vec<(usize, String, Object)>,
) -> Result<ActivityBlock, CodecError> {
    let mut block = ActivityBlock::new(subject);
    for (index, predicate, object) in statements {
        match (predicate.as_str(), object) {
            ("dcterms:title", Object::Literal(v)) => block.title = Some(v),
            ("dcterms:description", Object::Literal(v)) => block.description = Some(v),
            ("prov:wasAttributedTo", Object::Literal(v)) => block.attributed_to = Some(v),
            ("prov:startedAtTime", Object::Timestamp(t)) => block.started_at = Some(t),
            ("prov:endedAtTime", Object::Timestamp(t)) => block.ended_at = Some(t),
            ("prov:used", Object::Resource(u)) => block.used.push(u),
            ("prov:generated", Object::Resource(u)) => block.generated.push(u),
            (predicate, _) => {
                return Err(malformed(
                    index,
                    format!("unsupported activity statement `{predicate}`"),
                ))
            }
        }
    }
    Ok(block)
}

fn build_entity(
    subject: Url,
    statements: Vec<(usize, String, Object)>,
) -> Result<EntityRecord, CodecError> {
    let mut entity = EntityRecord::new(subject);
    for (index, predicate, object) in statements {
        match (predicate.as_str(), object) {
            ("dcterms:title", Object::Literal(v)) => entity.title = Some(v),
            ("dcterms:description", Object::Literal(v)) => entity.description = Some(v),
            ("prov:wasAttributedTo", Object::Literal(v)) => entity.attributed_to = Some(v),
            ("dcterms:created", Object::Timestamp(t)) => entity.created = Some(t),
            ("dcterms:rights", Object::Literal(v)) => entity.rights = Some(v),
            ("dcat:downloadURL", Object::AnyUri(u)) => entity.download_url = Some(u),
            (predicate, _) => {
                return Err(malformed(
                    index,
                    format!("unsupported entity statement `{predicate}`"),
                ))
            }
        }
    }
    Ok(entity)
}

fn malformed(index: usize, reason: impl Into<String>) -> CodecError {
    CodecError::MalformedStatement {
        line: index + 1,
        reason: reason.into(),
    }
}

fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn fmt_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}
