//! Email parsing and classification.
//!
//! A full check runs syntax, then alias, then disposable domain, and stops at
//! the first rule that fails.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AccountError, Result};

/// Disposable-mail providers refused at sign-up. Matched exactly against the
/// lowercased domain; subdomains are not covered.
const PROHIBITED_DOMAINS: &[&str] = &[
    "0box.eu",
    "10minutemail.com",
    "anonbox.net",
    "contbay.com",
    "damnthespam.com",
    "dispostable.com",
    "fakemailgenerator.com",
    "grr.la",
    "guerillamail.biz",
    "guerillamail.com",
    "guerillamail.de",
    "guerillamail.info",
    "guerillamail.net",
    "guerillamail.org",
    "guerillamailblock.com",
    "hjdosage.com",
    "koszmail.pl",
    "kurzepost.de",
    "mailcatch.com",
    "mailforspam.com",
    "mailinator.com",
    "objectmail.com",
    "pokemail.net",
    "proxymail.eu",
    "rcpt.at",
    "sharklasers.com",
    "spamavert.com",
    "spam4.me",
    "trash-mail.at",
    "trash-mail.com",
    "trashmail.com",
    "trashmail.io",
    "trashmail.me",
    "trashmail.net",
    "trbvn.com",
    "urhen.com",
    "wegwerfmail.de",
    "wegwerfmail.net",
    "wegwerfmail.org",
    "yopmail.com",
];

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,24}$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// A syntactically valid address split at its `@`. The domain is lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub local_part: String,
    pub domain: String,
}

impl Email {
    /// Syntax check only; alias and domain rules are not applied.
    pub fn parse(raw: &str) -> Result<Self> {
        if !email_regex().is_match(raw) {
            return Err(AccountError::MalformedEmail(raw.to_string()));
        }
        let (local_part, domain) = raw
            .rsplit_once('@')
            .ok_or_else(|| AccountError::MalformedEmail(raw.to_string()))?;
        Ok(Self {
            local_part: local_part.to_string(),
            domain: domain.to_lowercase(),
        })
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local_part, self.domain)
    }
}

/// `+` in the local part marks sub-addressing, refused to stop duplicate accounts.
pub fn is_aliased(local_part: &str) -> bool {
    local_part.contains('+')
}

pub fn is_known_spam_domain(email: &Email) -> bool {
    PROHIBITED_DOMAINS.contains(&email.domain.as_str())
}

/// Full check: syntax, alias, then disposable domain. First failure wins.
pub fn validate(raw: &str) -> Result<Email> {
    let email = Email::parse(raw)?;
    if is_aliased(&email.local_part) {
        return Err(AccountError::AliasedEmail(raw.to_string()));
    }
    if is_known_spam_domain(&email) {
        return Err(AccountError::ProhibitedDomain(raw.to_string()));
    }
    Ok(email)
}
