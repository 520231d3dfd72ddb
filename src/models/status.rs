use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a string-backed status enum stored as TEXT
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// The value stored in the database
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("Unknown {}: {}", stringify!($name), other)),
                }
            }
        }
    };
}

text_enum!(
    /// Lifecycle of a request for quotation
    RequestStatus {
        PendingAdmin => "pending_admin",
        Sent => "sent",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

text_enum!(
    /// Lifecycle of a supplier's quote
    QuoteStatus {
        Draft => "draft",
        Submitted => "submitted",
        SentToClient => "sent_to_client",
    }
);

text_enum!(
    /// Progress of one supplier's personal link
    TokenStatus {
        Pending => "pending",
        Viewed => "viewed",
        Submitted => "submitted",
    }
);

text_enum!(
    /// Why a material was flagged to suppliers after a snapshot refresh
    MaterialChange {
        Added => "added",
        Updated => "updated",
    }
);

text_enum!(
    /// Whether an archived material quotation takes part in comparisons
    QuotationStatus {
        Active => "active",
        Archived => "archived",
    }
);

text_enum!(
    /// What a collaborator may do on a shared project
    CollaboratorRole {
        Editor => "editor",
        Viewer => "viewer",
    }
);

text_enum!(
    CollaboratorStatus {
        Pending => "pending",
        Accepted => "accepted",
    }
);
