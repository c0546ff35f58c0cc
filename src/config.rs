/*
 * Copyright 2025  Simon Arlott
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use std::{ffi::OsString, path::PathBuf};

use clap::{ArgAction, CommandFactory, Parser};
use thiserror::Error;
use url::Url;

#[derive(Debug, clap::Parser)]
#[command(version, about = "Start a browser in kiosk mode on a Grafana dashboard")]
pub struct CommandLineArgs {
	/// URL to Grafana server
	#[arg(long = "URL", value_name = "URL", default_value = "https://play.grafana.org")]
	pub url: String,

	/// Login method: [anon|local|gcom]
	#[arg(long = "login-method", value_name = "METHOD", default_value = "anon")]
	pub login_method: String,

	#[arg(long, default_value = "guest", allow_hyphen_values = true)]
	pub username: String,

	#[arg(long, default_value = "guest", allow_hyphen_values = true)]
	pub password: String,

	/// Kiosk mode: [default|tv|false]
	#[arg(long = "kiosk-mode", value_name = "MODE", default_value = "default")]
	pub kiosk_mode: String,

	/// Autofit panels in kiosk mode
	#[arg(
		long,
		value_name = "BOOL",
		action = ArgAction::Set,
		default_value_t = true,
		default_missing_value = "true",
		num_args = 0..=1,
		require_equals = true
	)]
	pub autofit: bool,

	/// URL is a playlist
	#[arg(
		long,
		value_name = "BOOL",
		action = ArgAction::Set,
		default_value_t = false,
		default_missing_value = "true",
		num_args = 0..=1,
		require_equals = true
	)]
	pub playlist: bool,

	/// Initialize LXDE for kiosk mode
	#[arg(
		long,
		value_name = "BOOL",
		action = ArgAction::Set,
		default_value_t = true,
		default_missing_value = "true",
		num_args = 0..=1,
		require_equals = true
	)]
	pub lxde: bool,

	/// Path to home directory of LXDE user running X Server
	#[arg(long = "lxde-home", value_name = "DIR", default_value = "/home/pi")]
	pub lxde_home: PathBuf,

	/// Debug logging
	#[arg(short, long, action = ArgAction::Count)]
	pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
pub enum LoginMethod {
	Anonymous,
	Local,
	Gcom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
pub enum KioskMode {
	/// Sidebar hidden, menu still usable
	Tv,
	/// No sidebar or top navigation
	Normal,
	/// Kiosk mode disabled
	None,
}

#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
	pub username: String,
	#[debug("***")]
	pub password: String,
}

/// How the dashboard is presented once the browser is on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
	pub kiosk_mode: KioskMode,
	pub autofit: bool,
	pub playlist: bool,
}

#[derive(Debug, Clone)]
pub struct Settings {
	pub url: Url,
	pub login_method: LoginMethod,
	pub credentials: Credentials,
	pub view: ViewOptions,
	pub lxde: bool,
	pub lxde_home: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("URL is required")]
	MissingUrl,

	#[error("Invalid URL {url:?}: {source}")]
	InvalidUrl {
		url: String,
		#[source]
		source: url::ParseError,
	},
}

impl CommandLineArgs {
	/// Parse arguments written either as `-flag=value` or `--flag=value`.
	pub fn parse_go_style<I, T>(args: I) -> Result<Self, clap::Error>
	where
		I: IntoIterator<Item = T>,
		T: Into<OsString>,
	{
		Self::try_parse_from(normalize_args(args))
	}
}

/// Rewrite single-dash long flags (`-login-method=local`) as double-dash
/// flags. Values of flags that take a separate argument and everything
/// after `--` are passed through untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
	I: IntoIterator<Item = T>,
	T: Into<OsString>,
{
	let command = CommandLineArgs::command();
	let flags: Vec<(&str, bool)> = command
		.get_arguments()
		.filter_map(|arg| {
			arg.get_long().map(|long| {
				let separate_value = arg.get_action().takes_values() && !arg.is_require_equals_set();

				(long, separate_value)
			})
		})
		.collect();
	let mut literal = false;
	let mut value_next = false;

	args.into_iter()
		.map(Into::into)
		.enumerate()
		.map(|(index, arg)| {
			if index == 0 || literal {
				return arg;
			}
			if value_next {
				value_next = false;
				return arg;
			}
			if arg == "--" {
				literal = true;
				return arg;
			}

			let Some(text) = arg.to_str() else {
				return arg;
			};
			let name = text
				.trim_start_matches('-')
				.split_once('=')
				.map_or(text.trim_start_matches('-'), |(name, _)| name);
			let Some(&(_, separate_value)) = flags.iter().find(|(long, _)| *long == name) else {
				return arg;
			};

			value_next = separate_value && !text.contains('=');

			if text.starts_with("--") {
				arg
			} else {
				OsString::from(format!("-{text}"))
			}
		})
		.collect()
}

impl From<&str> for LoginMethod {
	fn from(value: &str) -> Self {
		match value {
			"anon" => Self::Anonymous,
			"local" => Self::Local,
			"gcom" => Self::Gcom,
			_ => Self::Anonymous,
		}
	}
}

impl From<&str> for KioskMode {
	fn from(value: &str) -> Self {
		match value {
			"tv" => Self::Tv,
			"false" => Self::None,
			"default" => Self::Normal,
			_ => Self::Normal,
		}
	}
}

impl TryFrom<&CommandLineArgs> for Settings {
	type Error = ConfigError;

	fn try_from(args: &CommandLineArgs) -> Result<Self, Self::Error> {
		if args.url.is_empty() {
			return Err(ConfigError::MissingUrl);
		}

		let url = Url::parse(&args.url).map_err(|source| ConfigError::InvalidUrl {
			url: args.url.clone(),
			source,
		})?;

		Ok(Self {
			url,
			login_method: LoginMethod::from(args.login_method.as_str()),
			credentials: Credentials {
				username: args.username.clone(),
				password: args.password.clone(),
			},
			view: ViewOptions {
				kiosk_mode: KioskMode::from(args.kiosk_mode.as_str()),
				autofit: args.autofit,
				playlist: args.playlist,
			},
			lxde: args.lxde,
			lxde_home: args.lxde_home.clone(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn settings(args: &[&str]) -> Result<Settings, ConfigError> {
		let args = CommandLineArgs::parse_go_style(
			std::iter::once("grafana-kiosk").chain(args.iter().copied()),
		)
		.unwrap();

		Settings::try_from(&args)
	}

	#[test]
	fn defaults() {
		let settings = settings(&[]).unwrap();

		assert_eq!(settings.url, Url::parse("https://play.grafana.org").unwrap());
		assert_eq!(settings.login_method, LoginMethod::Anonymous);
		assert_eq!(
			settings.credentials,
			Credentials {
				username: "guest".to_owned(),
				password: "guest".to_owned(),
			}
		);
		assert_eq!(
			settings.view,
			ViewOptions {
				kiosk_mode: KioskMode::Normal,
				autofit: true,
				playlist: false,
			}
		);
		assert!(settings.lxde);
		assert_eq!(settings.lxde_home, PathBuf::from("/home/pi"));
	}

	#[test]
	fn go_style_local_login() {
		let settings = settings(&[
			"-URL=https://play.grafana.org",
			"-login-method=local",
			"-username=u",
			"-password=p",
			"-autofit=false",
		])
		.unwrap();

		assert_eq!(settings.url.as_str(), "https://play.grafana.org/");
		assert_eq!(settings.login_method, LoginMethod::Local);
		assert_eq!(settings.credentials.username, "u");
		assert_eq!(settings.credentials.password, "p");
		assert!(!settings.view.autofit);
	}

	#[test]
	fn gnu_style_and_separate_values() {
		let settings = settings(&[
			"--URL",
			"https://grafana.example.com/d/abc",
			"-login-method",
			"gcom",
			"--lxde=false",
			"-playlist",
			"-lxde-home",
			"/home/kiosk",
		])
		.unwrap();

		assert_eq!(settings.url.as_str(), "https://grafana.example.com/d/abc");
		assert_eq!(settings.login_method, LoginMethod::Gcom);
		assert!(!settings.lxde);
		assert!(settings.view.playlist);
		assert_eq!(settings.lxde_home, PathBuf::from("/home/kiosk"));
	}

	#[test]
	fn login_method_mapping() {
		for (value, expected) in [
			("anon", LoginMethod::Anonymous),
			("local", LoginMethod::Local),
			("gcom", LoginMethod::Gcom),
			("oauth", LoginMethod::Anonymous),
			("", LoginMethod::Anonymous),
			("LOCAL", LoginMethod::Anonymous),
		] {
			assert_eq!(LoginMethod::from(value), expected, "{value:?}");
		}
	}

	#[test]
	fn kiosk_mode_mapping() {
		for (value, expected) in [
			("tv", KioskMode::Tv),
			("false", KioskMode::None),
			("default", KioskMode::Normal),
			("full", KioskMode::Normal),
			("", KioskMode::Normal),
		] {
			assert_eq!(KioskMode::from(value), expected, "{value:?}");
		}
	}

	#[test]
	fn unknown_values_fall_back() {
		let settings = settings(&["-login-method=ldap", "-kiosk-mode=off"]).unwrap();

		assert_eq!(settings.login_method, LoginMethod::Anonymous);
		assert_eq!(settings.view.kiosk_mode, KioskMode::Normal);
	}

	#[test]
	fn empty_url() {
		assert!(matches!(settings(&["-URL="]), Err(ConfigError::MissingUrl)));
	}

	#[test]
	fn invalid_url() {
		match settings(&["-URL=not a url"]) {
			Err(ConfigError::InvalidUrl { url, .. }) => assert_eq!(url, "not a url"),
			other => panic!("unexpected result: {other:?}"),
		}
	}

	#[test]
	fn valid_urls() {
		for url in [
			"https://play.grafana.org",
			"http://localhost:3000/d/000000012/grafana-play-home?orgId=1",
			"http://192.168.1.10:3000/playlists/play/1",
		] {
			assert!(settings(&[format!("-URL={url}").as_str()]).is_ok(), "{url}");
		}
	}

	#[test]
	fn password_hidden_from_debug() {
		let credentials = Credentials {
			username: "admin".to_owned(),
			password: "hunter2".to_owned(),
		};
		let debug = format!("{credentials:?}");

		assert!(debug.contains("admin"));
		assert!(!debug.contains("hunter2"));
	}

	#[test]
	fn normalize_leaves_values_and_tail() {
		let args = normalize_args([
			"grafana-kiosk",
			"-password",
			"-lxde",
			"-v",
			"-autofit",
			"--",
			"-URL=x",
		]);

		assert_eq!(
			args,
			[
				"grafana-kiosk",
				"--password",
				"-lxde",
				"-v",
				"--autofit",
				"--",
				"-URL=x"
			]
			.map(OsString::from)
		);
	}
}
