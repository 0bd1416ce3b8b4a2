use crate::source::ContactSource;
use crate::vcf::parse_vcf;
use crate::{Result, SourceError};
use contactbook_core::{AuthStatus, ContactId, RawContact};
use tracing::{debug, warn};

const ERR_NOT_AUTHORIZED: i32 = -1743;
const ERR_CONSENT_REQUIRED: i32 = -1744;
const ERR_NO_SUCH_OBJECT: i32 = -1728;

const PROBE_BODY: &str = r#"set output to (count of people) as text"#;

const ALL_CONTACTS_BODY: &str = r#"if (count of argv) is 0 then
                    set targetPeople to people
                else
                    set targetPeople to people of (first group whose name is (item 1 of argv))
                end if
                set chunks to {}
                repeat with p in targetPeople
                    set end of chunks to "X-ABUID:" & (id of p) & linefeed & (vcard of p)
                end repeat
                set AppleScript's text item delimiters to linefeed
                set output to chunks as text"#;

const CONTACT_IDS_BODY: &str = r#"if (count of argv) is 0 then
                    set ids to id of people
                else
                    set ids to id of people of (first group whose name is (item 1 of argv))
                end if
                set AppleScript's text item delimiters to linefeed
                set output to ids as text"#;

const CONTACT_BY_ID_BODY: &str = r#"set p to person id (item 1 of argv)
                set output to "X-ABUID:" & (id of p) & linefeed & (vcard of p)"#;

const ME_BODY: &str = r#"set p to my card
                if p is not missing value then
                    set output to "X-ABUID:" & (id of p) & linefeed & (vcard of p)
                end if"#;

/// The macOS Contacts app, driven through `osascript`.
#[derive(Debug, Clone, Default)]
pub struct MacosContactsSource {
    pub group: Option<String>,
}

impl MacosContactsSource {
    pub fn new(group: Option<String>) -> Self {
        Self { group }
    }

    fn group_args(&self) -> Vec<&str> {
        self.group
            .as_deref()
            .map(str::trim)
            .filter(|group| !group.is_empty())
            .into_iter()
            .collect()
    }

    // osascript has no query that skips the consent prompt, so checking the
    // status and requesting it run the same probe.
    fn probe_auth(&self) -> Result<AuthStatus> {
        match run_contacts_script(PROBE_BODY, &[]) {
            Ok(_) => Ok(AuthStatus::Authorized),
            Err(err) => match auth_status_for_error(&err.to_string()) {
                Some(status) => Ok(status),
                None => Err(err),
            },
        }
    }
}

impl ContactSource for MacosContactsSource {
    fn source_name(&self) -> &'static str {
        "macos-contacts"
    }

    fn request_auth_status(&self) -> Result<AuthStatus> {
        self.probe_auth()
    }

    fn get_auth_status(&self) -> Result<AuthStatus> {
        self.probe_auth()
    }

    fn get_all_contacts(&self) -> Result<Vec<RawContact>> {
        let output = run_contacts_script(ALL_CONTACTS_BODY, &self.group_args())?;
        parse_cards(&output)
    }

    fn get_all_contact_ids(&self) -> Result<Vec<ContactId>> {
        let output = run_contacts_script(CONTACT_IDS_BODY, &self.group_args())?;
        parse_ids(&output)
    }

    fn get_contact_by_id(&self, id: &ContactId) -> Result<Option<RawContact>> {
        match run_contacts_script(CONTACT_BY_ID_BODY, &[id.as_str()]) {
            Ok(output) => Ok(parse_cards(&output)?.into_iter().next()),
            Err(err) if script_error_code(&err.to_string()) == Some(ERR_NO_SUCH_OBJECT) => {
                debug!(id = %id, "contact not found");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn get_me(&self) -> Result<RawContact> {
        let output = run_contacts_script(ME_BODY, &[])?;
        Ok(parse_cards(&output)?.into_iter().next().unwrap_or_default())
    }
}

fn parse_cards(output: &str) -> Result<Vec<RawContact>> {
    let parsed = parse_vcf(output)?;
    for warning in &parsed.warnings {
        warn!(source = "macos-contacts", "{warning}");
    }
    Ok(parsed.contacts)
}

fn parse_ids(output: &str) -> Result<Vec<ContactId>> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| ContactId::new(line).map_err(SourceError::from))
        .collect()
}

fn auth_status_for_error(message: &str) -> Option<AuthStatus> {
    match script_error_code(message)? {
        ERR_NOT_AUTHORIZED => Some(AuthStatus::Denied),
        ERR_CONSENT_REQUIRED => Some(AuthStatus::NotDetermined),
        _ => None,
    }
}

// osascript reports failures as `... execution error: <text> (-1743)`.
fn script_error_code(message: &str) -> Option<i32> {
    let start = message.rfind("(-")?;
    let rest = &message[start + 1..];
    let end = rest.find(')')?;
    rest[..end].parse().ok()
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn contacts_script(body: &str) -> String {
    format!(
        r#"
on run argv
    set output to ""
    set succeeded to false
    repeat 5 times
        try
            tell application "Contacts"
                {body}
            end tell
            set succeeded to true
            exit repeat
        on error errMsg number errNum
            if errNum is -600 then
                tell application "Contacts" to launch
                delay 0.2
            else
                error errMsg number errNum
            end if
        end try
    end repeat
    if succeeded is false then
        error "Contacts did not respond" number -600
    end if
    return output
end run
"#
    )
}

#[cfg(target_os = "macos")]
fn run_contacts_script(body: &str, args: &[&str]) -> Result<String> {
    use std::process::Command;

    let script = contacts_script(body);
    let mut cmd = Command::new("osascript");
    cmd.arg("-e").arg(script);
    cmd.args(args);

    debug!(args = args.len(), "running osascript");
    let output = cmd.output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = if stderr.trim().is_empty() {
            format!("osascript exited with status {}", output.status)
        } else {
            stderr.trim().to_string()
        };
        return Err(SourceError::Command(message));
    }

    String::from_utf8(output.stdout)
        .map_err(|_| SourceError::Parse("macOS Contacts output was not valid UTF-8".to_string()))
}

#[cfg(not(target_os = "macos"))]
fn run_contacts_script(_body: &str, _args: &[&str]) -> Result<String> {
    Err(SourceError::Unavailable(
        "macOS Contacts is only available on macOS".to_string(),
    ))
}
