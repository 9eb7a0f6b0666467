//! Prebuilt form templates
//!
//! A fixed catalog of starting points. Instantiating one copies its fields and
//! settings into a fresh form owned by the caller.

use crate::models::{CorrectAnswer, FieldType, Form, FormField, FormSettings};
use chrono::Utc;
use once_cell::sync::Lazy;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub icon: &'static str,
    pub fields: Vec<FormField>,
    pub settings: FormSettings,
}

impl FormTemplate {
    /// A new active form with this template's content, owned by `owner`
    pub fn instantiate(&self, owner: Uuid) -> Form {
        let now = Utc::now();
        Form {
            id: Uuid::new_v4(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            fields: self.fields.clone(),
            settings: self.settings,
            user_id: owner,
            created_at: now,
            updated_at: now,
            response_count: 0,
            is_active: true,
        }
    }
}

/// Settings shared by the non-quiz templates
fn survey_settings(allow_multiple: bool, progress_bar: bool, collect_email: bool) -> FormSettings {
    FormSettings {
        allow_multiple_submissions: allow_multiple,
        show_progress_bar: progress_bar,
        collect_email,
        is_quiz: false,
        show_results: false,
        is_public: true,
        require_auth: false,
    }
}

fn full_name() -> FormField {
    FormField::new("name", FieldType::Text, "Full Name")
        .required()
        .with_placeholder("Enter your full name")
}

fn email_address() -> FormField {
    FormField::new("email", FieldType::Email, "Email Address")
        .required()
        .with_placeholder("Enter your email")
}

fn phone_number() -> FormField {
    FormField::new("phone", FieldType::Phone, "Phone Number")
        .required()
        .with_placeholder("Enter your phone number")
}

const FEATURE_OPTIONS: [&str; 5] = ["Dashboard", "Reports", "Analytics", "Integrations", "Mobile App"];

static TEMPLATES: Lazy<Vec<FormTemplate>> = Lazy::new(|| {
    vec![
        FormTemplate {
            id: "customer-feedback",
            title: "Customer Feedback Survey",
            description: "Collect customer feedback and satisfaction ratings",
            category: "Business",
            icon: "📊",
            fields: vec![
                full_name(),
                email_address(),
                FormField::new("satisfaction", FieldType::Radio, "How satisfied are you with our service?")
                    .required()
                    .with_options([
                        "Very Satisfied",
                        "Satisfied",
                        "Neutral",
                        "Dissatisfied",
                        "Very Dissatisfied",
                    ]),
                FormField::new(
                    "features",
                    FieldType::Checkbox,
                    "Which features do you use most? (Select all that apply)",
                )
                .with_options(FEATURE_OPTIONS),
                FormField::new("rating", FieldType::Rating, "Rate our customer support").required(),
                FormField::new("comments", FieldType::Textarea, "Additional Comments")
                    .with_placeholder("Share your feedback..."),
            ],
            settings: survey_settings(false, true, true),
        },
        FormTemplate {
            id: "event-registration",
            title: "Event Registration Form",
            description: "Register attendees for events and conferences",
            category: "Events",
            icon: "🎟️",
            fields: vec![
                full_name(),
                email_address(),
                phone_number(),
                FormField::new("ticket-type", FieldType::Select, "Ticket Type")
                    .required()
                    .with_options(["General Admission", "VIP", "Student", "Senior"]),
                FormField::new("dietary", FieldType::Checkbox, "Dietary Restrictions")
                    .with_options(["Vegetarian", "Vegan", "Gluten-Free", "Nut Allergy", "None"]),
                FormField::new("special-requests", FieldType::Textarea, "Special Requests")
                    .with_placeholder("Any special accommodations needed?"),
            ],
            settings: survey_settings(false, true, true),
        },
        FormTemplate {
            id: "job-application",
            title: "Job Application Form",
            description: "Collect job applications and candidate information",
            category: "HR",
            icon: "💼",
            fields: vec![
                full_name(),
                email_address(),
                phone_number(),
                FormField::new("position", FieldType::Select, "Position Applied For")
                    .required()
                    .with_options([
                        "Software Engineer",
                        "Product Manager",
                        "Designer",
                        "Marketing Manager",
                        "Sales Representative",
                    ]),
                FormField::new("experience", FieldType::Radio, "Years of Experience")
                    .required()
                    .with_options(["0-1 years", "2-5 years", "6-10 years", "10+ years"]),
                FormField::new("motivation", FieldType::Textarea, "Why do you want to work with us?")
                    .required()
                    .with_placeholder("Tell us about your motivation..."),
            ],
            settings: survey_settings(false, true, true),
        },
        FormTemplate {
            id: "product-survey",
            title: "Product Feedback Survey",
            description: "Get feedback on products and services",
            category: "Marketing",
            icon: "🛍️",
            fields: vec![
                FormField::new("discovery", FieldType::Radio, "How did you hear about our product?")
                    .required()
                    .with_options([
                        "Social Media",
                        "Google Search",
                        "Friend Referral",
                        "Advertisement",
                        "Other",
                    ]),
                FormField::new("quality-rating", FieldType::Rating, "Rate the product quality").required(),
                FormField::new("features-used", FieldType::Checkbox, "Which features do you use most?")
                    .with_options(FEATURE_OPTIONS),
                FormField::new("improvements", FieldType::Textarea, "What improvements would you suggest?")
                    .with_placeholder("Share your suggestions..."),
                FormField::new("recommend", FieldType::Radio, "Would you recommend this product to others?")
                    .required()
                    .with_options([
                        "Definitely",
                        "Probably",
                        "Not sure",
                        "Probably not",
                        "Definitely not",
                    ]),
            ],
            settings: survey_settings(false, true, false),
        },
        FormTemplate {
            id: "quiz-template",
            title: "Knowledge Quiz",
            description: "Create engaging quizzes with scoring",
            category: "Education",
            icon: "🧠",
            fields: vec![
                FormField::new("q1", FieldType::Radio, "What is the capital of France?")
                    .required()
                    .with_options(["London", "Berlin", "Paris", "Madrid"])
                    .with_answer(CorrectAnswer::Single("Paris".into()))
                    .with_points(1),
                FormField::new("q2", FieldType::Radio, "Which planet is closest to the Sun?")
                    .required()
                    .with_options(["Venus", "Mercury", "Earth", "Mars"])
                    .with_answer(CorrectAnswer::Single("Mercury".into()))
                    .with_points(1),
                FormField::new("q3", FieldType::Checkbox, "Which of these are programming languages?")
                    .required()
                    .with_options(["JavaScript", "HTML", "Python", "CSS", "Java"])
                    .with_answer(CorrectAnswer::Set(vec![
                        "JavaScript".into(),
                        "Python".into(),
                        "Java".into(),
                    ]))
                    .with_points(2),
                FormField::new("q4", FieldType::Radio, "What does HTML stand for?")
                    .required()
                    .with_options([
                        "Hyper Text Markup Language",
                        "High Tech Modern Language",
                        "Home Tool Markup Language",
                        "Hyperlink and Text Markup Language",
                    ])
                    .with_answer(CorrectAnswer::Single("Hyper Text Markup Language".into()))
                    .with_points(1),
            ],
            settings: FormSettings {
                allow_multiple_submissions: true,
                show_progress_bar: true,
                collect_email: false,
                is_quiz: true,
                show_results: true,
                is_public: true,
                require_auth: false,
            },
        },
        FormTemplate {
            id: "newsletter-signup",
            title: "Newsletter Subscription",
            description: "Collect email subscribers for your newsletter",
            category: "Marketing",
            icon: "📧",
            fields: vec![
                FormField::new("first-name", FieldType::Text, "First Name")
                    .required()
                    .with_placeholder("Enter your first name"),
                FormField::new("last-name", FieldType::Text, "Last Name")
                    .required()
                    .with_placeholder("Enter your last name"),
                email_address(),
                FormField::new("interests", FieldType::Checkbox, "What topics interest you?")
                    .with_options(["Technology", "Business", "Design", "Marketing", "Productivity"]),
                FormField::new("frequency", FieldType::Radio, "How often would you like to receive emails?")
                    .required()
                    .with_options(["Daily", "Weekly", "Monthly", "Quarterly"]),
            ],
            settings: survey_settings(false, false, true),
        },
        FormTemplate {
            id: "contact-form",
            title: "Contact Us Form",
            description: "Simple contact form for customer inquiries",
            category: "Business",
            icon: "📞",
            fields: vec![
                full_name(),
                email_address(),
                FormField::new("subject", FieldType::Select, "Subject")
                    .required()
                    .with_options([
                        "General Inquiry",
                        "Support Request",
                        "Sales Question",
                        "Partnership",
                        "Other",
                    ]),
                FormField::new("message", FieldType::Textarea, "Message")
                    .required()
                    .with_placeholder("Enter your message..."),
            ],
            settings: survey_settings(true, false, true),
        },
    ]
});

pub fn all() -> &'static [FormTemplate] {
    &TEMPLATES
}

pub fn find(id: &str) -> Option<&'static FormTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}
