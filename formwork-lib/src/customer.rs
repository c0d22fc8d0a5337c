//! The customer sign-up form.
//!
//! Name, email (entered twice), notification preference with a phone number
//! that becomes required for text notifications, an optional 0-5 rating and
//! any number of postal addresses. The email field gets a debounced message.

use crate::error::FormResult;
use crate::form::{ConditionalRule, FormConfig, FormModel, MessageCatalog, PipelineId, Submission};
use crate::node::{ArrayNode, FieldNode, GroupNode};
use crate::validation::Rule;
use crate::value::Value;

/// Path of the email field the message pipeline watches.
pub const EMAIL_PATH: &str = "emailGroup.email";

/// Path of the address array.
pub const ADDRESSES_PATH: &str = "addresses";

/// One postal address, as appended by [`CustomerForm::add_address`].
pub fn build_address() -> GroupNode {
    GroupNode::new()
        .with_child("addressType", FieldNode::new("home"))
        .with_child("street1", FieldNode::new("").with_rule(Rule::Required))
        .with_child("street2", FieldNode::new(""))
        .with_child("city", FieldNode::new("").with_rule(Rule::Required))
        .with_child("state", FieldNode::new("").with_rule(Rule::Required))
        .with_child("zip", FieldNode::new("").with_rule(Rule::Required))
}

/// The customer form's node tree with its default values.
pub fn customer_group() -> GroupNode {
    GroupNode::new()
        .with_child(
            "firstName",
            FieldNode::new("").with_rules([Rule::Required, Rule::min_length(3)]),
        )
        .with_child(
            "lastName",
            FieldNode::new("").with_rules([Rule::Required, Rule::max_length(50)]),
        )
        .with_child(
            "emailGroup",
            GroupNode::new()
                .with_child("email", FieldNode::new("").with_rules([Rule::Required, Rule::Email]))
                .with_child("confirmEmail", FieldNode::new("").with_rule(Rule::Required))
                .with_rule(Rule::fields_match("email", "confirmEmail")),
        )
        .with_child("phone", FieldNode::new(""))
        .with_child("notification", FieldNode::new("email"))
        .with_child(
            "rating",
            FieldNode::new(Value::Null).with_rule(Rule::numeric_range(0.0, 5.0)),
        )
        .with_child("sendCatalog", FieldNode::new(false))
        .with_child(
            ADDRESSES_PATH,
            ArrayNode::with_factory(|| build_address().into()).with_len(1),
        )
}

/// Messages shown under the email field.
pub fn email_messages() -> MessageCatalog {
    MessageCatalog::new()
        .with_message("required", "Please enter your email address.")
        .with_message("email", "Please enter a valid email address.")
}

/// A live customer form.
///
/// Must be created inside a tokio runtime, which drives the email message
/// debounce.
#[derive(Debug, Clone)]
pub struct CustomerForm {
    form: FormModel,
    email_feedback: PipelineId,
}

impl CustomerForm {
    /// Builds the form with the default configuration.
    pub fn new() -> FormResult<Self> {
        Self::with_config(FormConfig::default())
    }

    /// Builds the form with a custom configuration.
    pub fn with_config(config: FormConfig) -> FormResult<Self> {
        let form = FormModel::with_config(customer_group(), config)?;

        // phone is only required for text notifications
        let phone_rule = ConditionalRule::new("notification", "text", "phone", Rule::Required)?;
        // the registration lives as long as the form
        let _ = form.add_conditional_rule(phone_rule)?;

        let email_feedback = form.feedback(EMAIL_PATH, email_messages())?;

        Ok(Self {
            form,
            email_feedback,
        })
    }

    /// Get the underlying form.
    pub fn form(&self) -> &FormModel {
        &self.form
    }

    /// Get the id of the email message pipeline.
    pub fn email_feedback(&self) -> PipelineId {
        self.email_feedback
    }

    /// Get the current email message (empty when there is nothing to say).
    pub fn email_message(&self) -> FormResult<String> {
        self.form.message(self.email_feedback)
    }

    /// Appends an empty address and returns its index.
    pub fn add_address(&self) -> FormResult<usize> {
        self.form.add_array_element(ADDRESSES_PATH)
    }

    /// Removes the address at `index`.
    pub fn remove_address(&self, index: usize) -> FormResult<()> {
        self.form.remove_array_element(ADDRESSES_PATH, index)
    }

    /// Returns validity and the full value; sending it anywhere is up to the
    /// caller.
    pub fn save(&self) -> Submission {
        self.form.submit()
    }
}
