//! Parsed attribute requests.

use bitflags::bitflags;

use crate::matcher::{AttributeMatcher, Token, parse_token};

/// Namespace holding the standard, always-recognized fields.
pub const STANDARD_NAMESPACE: &str = "standard";
/// Namespace holding fields derived from the stat call.
pub const STAT_NAMESPACE: &str = "stat";

bitflags! {
    /// Standard fields a caller can ask for without going through a matcher.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct RequestFlags: u32 {
        /// Base name of the target.
        const NAME = 1 << 0;
        /// Whether the base name starts with a dot.
        const IS_HIDDEN = 1 << 1;
        /// File type derived from the mode bits.
        const TYPE = 1 << 2;
        /// Size in bytes.
        const SIZE = 1 << 3;
        /// Last modification time.
        const MODIFICATION_TIME = 1 << 4;
        /// Remaining raw stat fields (mode, owner, device, inode, times, ...).
        const UNIX = 1 << 5;
        /// Target of a symbolic link.
        const SYMLINK_TARGET = 1 << 6;
        /// Effective access rights. Recognized, not collected.
        const ACCESS_RIGHTS = 1 << 7;
        /// Display name. Recognized, not collected.
        const DISPLAY_NAME = 1 << 8;
        /// Edit name. Recognized, not collected.
        const EDIT_NAME = 1 << 9;
        /// MIME type. Recognized, not collected.
        const MIME_TYPE = 1 << 10;
        /// Icon. Recognized, not collected.
        const ICON = 1 << 11;

        /// Fields that never require an OS call.
        const TRIVIAL = Self::NAME.bits() | Self::IS_HIDDEN.bits();
        /// Every field of the `stat` namespace.
        const STAT = Self::TYPE.bits()
            | Self::SIZE.bits()
            | Self::MODIFICATION_TIME.bits()
            | Self::UNIX.bits();
        /// Every field of the `standard` namespace.
        const STANDARD = Self::NAME.bits()
            | Self::IS_HIDDEN.bits()
            | Self::SYMLINK_TARGET.bits()
            | Self::ACCESS_RIGHTS.bits()
            | Self::DISPLAY_NAME.bits()
            | Self::EDIT_NAME.bits()
            | Self::MIME_TYPE.bits()
            | Self::ICON.bits();
        /// Placeholders that are accepted but produce no field.
        const PLACEHOLDERS = Self::ACCESS_RIGHTS.bits()
            | Self::DISPLAY_NAME.bits()
            | Self::EDIT_NAME.bits()
            | Self::MIME_TYPE.bits()
            | Self::ICON.bits();
    }
}

impl RequestFlags {
    /// Reports whether only fields that need no OS call were requested.
    #[must_use]
    pub fn is_trivial(self) -> bool {
        Self::TRIVIAL.contains(self)
    }

    fn for_standard_key(key: &str) -> Option<Self> {
        Some(match key {
            "*" => Self::STANDARD,
            "name" => Self::NAME,
            "is-hidden" => Self::IS_HIDDEN,
            "symlink-target" => Self::SYMLINK_TARGET,
            "access-rights" => Self::ACCESS_RIGHTS,
            "display-name" => Self::DISPLAY_NAME,
            "edit-name" => Self::EDIT_NAME,
            "mime-type" => Self::MIME_TYPE,
            "icon" => Self::ICON,
            _ => return None,
        })
    }

    fn for_stat_key(key: &str) -> Self {
        match key {
            "*" => Self::STAT,
            "type" => Self::TYPE,
            "size" => Self::SIZE,
            "mtime" => Self::MODIFICATION_TIME,
            _ => Self::UNIX,
        }
    }
}

/// Immutable parsed view of a request specification.
///
/// `standard:` and `stat:` tokens become [`RequestFlags`]; every other token
/// is handed to an [`AttributeMatcher`]. The matcher is absent when the
/// request names no other namespace, which lets directory listings that only
/// want names skip the stat call entirely.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RequestSpec {
    flags: RequestFlags,
    matcher: Option<AttributeMatcher>,
}

impl RequestSpec {
    /// Parses a comma separated specification string.
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        let mut flags = RequestFlags::empty();
        let mut matcher = AttributeMatcher::default();
        let mut has_matcher = false;

        for token in spec.split(',') {
            match parse_token(token) {
                Some(Token::All) => {
                    flags = RequestFlags::all();
                    matcher.add_token(token);
                    has_matcher = true;
                }
                Some(Token::Namespace(STANDARD_NAMESPACE)) => flags |= RequestFlags::STANDARD,
                Some(Token::Namespace(STAT_NAMESPACE)) => flags |= RequestFlags::STAT,
                Some(Token::Key(STANDARD_NAMESPACE, key)) => {
                    // Unknown standard keys are dropped like any malformed token.
                    if let Some(flag) = RequestFlags::for_standard_key(key) {
                        flags |= flag;
                    }
                }
                Some(Token::Key(STAT_NAMESPACE, key)) => flags |= RequestFlags::for_stat_key(key),
                Some(_) => {
                    matcher.add_token(token);
                    has_matcher = true;
                }
                None => {}
            }
        }

        Self {
            flags,
            matcher: has_matcher.then_some(matcher),
        }
    }

    /// Builds a request from explicit parts.
    #[must_use]
    pub const fn from_parts(flags: RequestFlags, matcher: Option<AttributeMatcher>) -> Self {
        Self { flags, matcher }
    }

    /// Returns the standard flags.
    #[must_use]
    pub const fn flags(&self) -> RequestFlags {
        self.flags
    }

    /// Returns the matcher for non-standard namespaces, if any were named.
    #[must_use]
    pub const fn matcher(&self) -> Option<&AttributeMatcher> {
        self.matcher.as_ref()
    }
}
