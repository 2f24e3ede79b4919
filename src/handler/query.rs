// Query string parsing for the endpoint's `action` and `sheet` parameters

/// Parameters the endpoint understands; everything else is ignored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestQuery {
    pub action: Option<String>,
    pub sheet: Option<String>,
}

/// What a GET asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadAction {
    ListSheets,
    Summary,
    LandedCost,
    /// Plain row read (no action, or one we do not know)
    Rows,
}

impl RequestQuery {
    pub fn action(&self) -> ReadAction {
        match self.action.as_deref() {
            Some("listSheets") => ReadAction::ListSheets,
            Some("summary") => ReadAction::Summary,
            Some("landedCost") => ReadAction::LandedCost,
            _ => ReadAction::Rows,
        }
    }
}

/// Parse `application/x-www-form-urlencoded` query parameters
///
/// The first occurrence of a parameter wins and empty values count as absent.
pub fn parse_query(query: Option<&str>) -> RequestQuery {
    let mut parsed = RequestQuery::default();

    for pair in query.unwrap_or_default().split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let slot = match decode(key).as_str() {
            "action" => &mut parsed.action,
            "sheet" => &mut parsed.sheet,
            _ => continue,
        };
        if slot.is_none() {
            let value = decode(value);
            if !value.is_empty() {
                *slot = Some(value);
            }
        }
    }

    parsed
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or(spaced.clone(), |s| s.into_owned())
}
