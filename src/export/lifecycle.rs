//! Bucket lifecycle policy for exported objects.
//!
//! Retention is left to the object store: the application only declares the
//! rule, it never deletes exports itself.

use crate::config::EXPORT_PREFIX;

pub const DEFAULT_RULE_ID: &str = "AutoExpirePortfolioExports";
pub const DEFAULT_EXPIRATION_DAYS: u32 = 30;
pub const DEFAULT_NONCURRENT_EXPIRATION_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecyclePolicy {
    pub id: String,
    pub prefix: String,
    /// Current objects expire this many days after creation
    pub expiration_days: u32,
    /// Overwritten versions expire this many days after becoming noncurrent
    pub noncurrent_expiration_days: u32,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            id: DEFAULT_RULE_ID.to_string(),
            prefix: EXPORT_PREFIX.to_string(),
            expiration_days: DEFAULT_EXPIRATION_DAYS,
            noncurrent_expiration_days: DEFAULT_NONCURRENT_EXPIRATION_DAYS,
        }
    }
}

impl LifecyclePolicy {
    /// Render as an S3 `LifecycleConfiguration` document
    pub fn to_xml(&self) -> String {
        format!(
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                "<LifecycleConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\n",
                "  <Rule>\n",
                "    <ID>{}</ID>\n",
                "    <Filter>\n",
                "      <Prefix>{}</Prefix>\n",
                "    </Filter>\n",
                "    <Status>Enabled</Status>\n",
                "    <Expiration>\n",
                "      <Days>{}</Days>\n",
                "    </Expiration>\n",
                "    <NoncurrentVersionExpiration>\n",
                "      <NoncurrentDays>{}</NoncurrentDays>\n",
                "    </NoncurrentVersionExpiration>\n",
                "  </Rule>\n",
                "</LifecycleConfiguration>\n"
            ),
            xml_escape(&self.id),
            xml_escape(&self.prefix),
            self.expiration_days,
            self.noncurrent_expiration_days
        )
    }
}

fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
