//! Built-in vendor drivers

mod bitbucket;
mod facebook;
mod github;
mod gitlab;
mod google;
mod linkedin;
mod linkedin_openid;
mod slack;
mod slack_openid;
mod twitch;
mod twitter;

pub use bitbucket::BitbucketDriver;
pub use facebook::FacebookDriver;
pub use github::GithubDriver;
pub use gitlab::GitlabDriver;
pub use google::GoogleDriver;
pub use linkedin::LinkedInDriver;
pub use linkedin_openid::LinkedInOpenIdDriver;
pub use slack::SlackDriver;
pub use slack_openid::SlackOpenIdDriver;
pub use twitch::TwitchDriver;
pub use twitter::TwitterDriver;
