//! Curriculum shipped with the application.

use super::curriculum::{Curriculum, Meta};
use super::topic::{Resource, ResourceKind, Topic};
use super::track::Track;

impl Curriculum {
    /// The bundled starting curriculum used before anything is loaded.
    pub fn bundled() -> Self {
        Curriculum::new(Meta {
            goal: "Solution Architect".to_string(),
            duration: "6 months".to_string(),
            study_time: "2 hours/day".to_string(),
        })
        .with_track("LLD", low_level_design())
        .with_track("HLD", high_level_design())
        .with_track("AWS", aws())
    }
}

fn low_level_design() -> Track {
    Track::new("Low-Level Design (LLD)")
        .with_duration("6 weeks")
        .with_topic(
            Topic::new("SOLID Principles")
                .with_description("Master the 5 core principles of object-oriented design.")
                .with_hours(6.0)
                .with_frequency(5)
                .with_micro_task("Refactor a class that violates SRP into collaborators.")
                .with_resource(Resource::new(
                    ResourceKind::Article,
                    "Detailed Guide to SOLID",
                    "https://www.digitalocean.com/community/conceptual-articles/s-o-l-i-d-the-first-five-principles-of-object-oriented-design",
                )),
        )
        .with_topic(
            Topic::new("Creational & Structural Patterns")
                .with_description("Learn Singleton, Factory, Observer, and Decorator patterns.")
                .with_hours(10.0)
                .with_frequency(4)
                .with_micro_task("Implement a pluggable notification sender with Factory.")
                .with_resource(Resource::new(
                    ResourceKind::Video,
                    "Refactoring Guru - Patterns",
                    "https://refactoring.guru/design-patterns",
                )),
        )
}

fn high_level_design() -> Track {
    Track::new("High-Level Design (HLD)")
        .with_duration("8 weeks")
        .with_topic(
            Topic::new("Scalability & Load Balancing")
                .with_description("Horizontal vs Vertical scaling, the role of Load Balancers.")
                .with_hours(8.0)
                .with_frequency(5)
                .with_resource(Resource::new(
                    ResourceKind::Article,
                    "The System Design Primer",
                    "https://github.com/donnemartin/system-design-primer",
                )),
        )
        .with_topic(
            Topic::new("Caching Strategies")
                .with_description("Read-through, write-through, write-back caching and Redis.")
                .with_hours(6.0)
                .with_frequency(4)
                .with_resource(Resource::new(
                    ResourceKind::Doc,
                    "AWS Caching Guide",
                    "https://aws.amazon.com/caching/",
                )),
        )
}

fn aws() -> Track {
    Track::new("AWS Solution Architect")
        .with_duration("10 weeks")
        .with_topic(
            Topic::new("IAM & VPC Networking")
                .with_description("Secure identities and isolated network environments.")
                .with_hours(12.0)
                .with_frequency(3)
                .with_micro_task("Build a two-tier VPC with private subnets and a bastion."),
        )
}
