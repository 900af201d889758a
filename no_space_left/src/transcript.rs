use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{space0, space1},
    combinator::{map, verify},
    error::{FromExternalError, ParseError},
    sequence::{preceded, separated_pair, terminated},
    IResult,
};
use tracing::{debug, trace};
use util::{parse_nice, parse_number, BadInput, Span};

use crate::error::FsError;
use crate::path::DirPath;
use crate::tree::DirectoryTree;

pub const COMMAND_MARKER: &str = "$ ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdTarget<'a> {
    Root,
    Parent,
    Child(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Cd(CdTarget<'a>),
    Ls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing<'a> {
    Dir(&'a str),
    File { size: i64, name: &'a str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    Command(Command<'a>),
    Output(Listing<'a>),
}

fn parse_name<'a, E>(i: Span<'a>) -> IResult<Span<'a>, &'a str, E>
where
    E: ParseError<Span<'a>>,
{
    map(is_not(" \t/"), |s: Span<'a>| *s.fragment())(i)
}

/// A name that can become a directory path segment.
fn parse_dir_name<'a, E>(i: Span<'a>) -> IResult<Span<'a>, &'a str, E>
where
    E: ParseError<Span<'a>>,
{
    verify(parse_name, |name: &str| name != "." && name != "..")(i)
}

fn parse_cd_target<'a, E>(i: Span<'a>) -> IResult<Span<'a>, CdTarget<'a>, E>
where
    E: ParseError<Span<'a>>,
{
    alt((
        map(tag("/"), |_| CdTarget::Root),
        map(
            verify(parse_name, |name: &str| name != "."),
            |name| match name {
                ".." => CdTarget::Parent,
                name => CdTarget::Child(name),
            },
        ),
    ))(i)
}

fn parse_command<'a, E>(i: Span<'a>) -> IResult<Span<'a>, Command<'a>, E>
where
    E: ParseError<Span<'a>>,
{
    preceded(
        tag(COMMAND_MARKER),
        alt((
            map(preceded(tag("cd"), preceded(space1, parse_cd_target)), Command::Cd),
            map(tag("ls"), |_| Command::Ls),
        )),
    )(i)
}

fn parse_listing<'a, E>(i: Span<'a>) -> IResult<Span<'a>, Listing<'a>, E>
where
    E: ParseError<Span<'a>> + FromExternalError<Span<'a>, anyhow::Error>,
{
    terminated(
        alt((
            map(preceded(tag("dir"), preceded(space1, parse_dir_name)), Listing::Dir),
            map(
                separated_pair(parse_number, space1, parse_name),
                |(size, name)| Listing::File { size, name },
            ),
        )),
        space0,
    )(i)
}

impl<'a> Line<'a> {
    /// Classifies a transcript line by its `$ ` prefix and parses it whole.
    pub fn parse(l: &'a str) -> Result<Self, BadInput> {
        if l.starts_with(COMMAND_MARKER) {
            parse_nice(l, parse_command).map(Line::Command)
        } else {
            let listing = parse_nice(l, parse_listing)?;
            if let Listing::File { size, .. } = listing {
                if size < 0 {
                    return Err(BadInput::new(l, 0, "file size must not be negative"));
                }
            }
            Ok(Line::Output(listing))
        }
    }
}

/// Replays a transcript line by line against a [`DirectoryTree`], keeping
/// track of the current directory.
#[derive(Debug, Default)]
pub struct Transcript {
    tree: DirectoryTree,
    cursor: Option<DirPath>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Option<&DirPath> {
        self.cursor.as_ref()
    }

    pub fn tree(&self) -> &DirectoryTree {
        &self.tree
    }

    pub fn into_tree(self) -> DirectoryTree {
        self.tree
    }

    fn current(&self) -> Result<&DirPath, FsError> {
        self.cursor.as_ref().ok_or(FsError::CursorUnset)
    }

    pub fn process(&mut self, line: &str) -> Result<(), FsError> {
        trace!("processing {line:?}");

        let parsed = Line::parse(line).map_err(|cause| FsError::MalformedInput {
            line: line.to_string(),
            cause,
        })?;

        match parsed {
            Line::Command(Command::Ls) => Ok(()),
            Line::Command(Command::Cd(target)) => self.cd(target),
            Line::Output(Listing::Dir(name)) => {
                let current = self.current()?.clone();
                self.tree.register_child(&current, &current.join(name));
                Ok(())
            }
            Line::Output(Listing::File { size, .. }) => {
                let current = self.current()?.clone();
                self.tree.add_file_size(&current, size)
            }
        }
    }

    fn cd(&mut self, target: CdTarget) -> Result<(), FsError> {
        let next = match target {
            CdTarget::Root => {
                let root = DirPath::root();
                self.tree.ensure_exists(&root);
                root
            }
            CdTarget::Parent => self.current()?.parent().ok_or(FsError::NoParent)?,
            CdTarget::Child(name) => {
                let current = self.current()?.clone();
                let child = current.join(name);
                self.tree.register_child(&current, &child);
                child
            }
        };

        debug!("cd {next}");
        self.cursor = Some(next);
        Ok(())
    }
}

/// Builds the whole tree, stopping at the first bad line.
pub fn build_tree(input: impl Iterator<Item = impl AsRef<str>>) -> Result<DirectoryTree, FsError> {
    let mut transcript = Transcript::new();
    for line in input {
        transcript.process(line.as_ref())?;
    }
    Ok(transcript.into_tree())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TEST_INPUT: &str = include_str!("../data/test_input");

    fn started() -> Transcript {
        let mut transcript = Transcript::new();
        transcript.process("$ cd /").unwrap();
        transcript
    }

    #[rstest]
    #[case("$ ls", Line::Command(Command::Ls))]
    #[case("$ cd /", Line::Command(Command::Cd(CdTarget::Root)))]
    #[case("$ cd ..", Line::Command(Command::Cd(CdTarget::Parent)))]
    #[case("$ cd a", Line::Command(Command::Cd(CdTarget::Child("a"))))]
    #[case("dir e", Line::Output(Listing::Dir("e")))]
    #[case("584 i", Line::Output(Listing::File { size: 584, name: "i" }))]
    #[case("62596 h.lst", Line::Output(Listing::File { size: 62596, name: "h.lst" }))]
    #[case("8 dir", Line::Output(Listing::File { size: 8, name: "dir" }))]
    #[case("dir a ", Line::Output(Listing::Dir("a")))]
    #[case("14 b.txt\t", Line::Output(Listing::File { size: 14, name: "b.txt" }))]
    #[case("$ cd ...", Line::Command(Command::Cd(CdTarget::Child("..."))))]
    #[case("dir ..x", Line::Output(Listing::Dir("..x")))]
    fn parse_ok(#[case] input: &str, #[case] expected: Line) {
        let res = Line::parse(input);
        assert!(res.is_ok());
        assert_eq!(res.unwrap(), expected);
    }

    #[rstest]
    #[case("$ mkdir x")]
    #[case("$ lsx")]
    #[case("$ cd")]
    #[case("$ cd a b")]
    #[case("$ cd /a")]
    #[case("12 34 56")]
    #[case("dir")]
    #[case("abc def")]
    #[case("-5 f")]
    #[case("$ls")]
    #[case("dir .")]
    #[case("dir ..")]
    #[case("$ cd .")]
    #[case("$ ls ")]
    fn malformed_lines_are_rejected(#[case] input: &str) {
        let mut transcript = started();
        let res = transcript.process(input);
        assert!(
            matches!(res, Err(FsError::MalformedInput { ref line, .. }) if line == input),
            "{input:?} gave {res:?}"
        );
    }

    #[test]
    fn huge_files_overflow_instead_of_wrapping() {
        let mut transcript = started();
        transcript.process("9223372036854775807 a").unwrap();
        transcript.process("9223372036854775807 a").unwrap();

        let res = transcript.process("9223372036854775807 a");

        assert!(matches!(res, Err(FsError::SizeOverflow { ref path }) if path.is_root()));
        assert_eq!(
            transcript.tree().total_size(&DirPath::root()).unwrap(),
            2 * i64::MAX as u64
        );
    }

    #[test]
    fn cd_parent_from_root_fails() {
        let mut transcript = started();
        let res = transcript.process("$ cd ..");
        assert!(matches!(res, Err(FsError::NoParent)));
        assert_eq!(transcript.cursor(), Some(&DirPath::root()));
    }

    #[rstest]
    #[case("$ cd a")]
    #[case("$ cd ..")]
    #[case("dir a")]
    #[case("10 f")]
    fn cursor_must_be_set_first(#[case] input: &str) {
        let mut transcript = Transcript::new();
        assert!(matches!(transcript.process(input), Err(FsError::CursorUnset)));
    }

    #[test]
    fn ls_before_root_is_harmless() {
        let mut transcript = Transcript::new();
        assert!(transcript.process("$ ls").is_ok());
        assert!(transcript.tree().is_empty());
    }

    #[test]
    fn dir_listing_and_cd_converge() {
        let mut transcript = started();
        for line in ["$ ls", "dir a", "$ cd a", "$ ls", "100 f", "$ cd ..", "dir a"] {
            transcript.process(line).unwrap();
        }

        let root = DirPath::root();
        let a = root.join("a");
        let tree = transcript.tree();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(&root).unwrap().children().len(), 1);
        assert_eq!(tree.get(&a).unwrap().direct_file_size(), 100);
        assert_eq!(transcript.cursor(), Some(&root));
    }

    #[test]
    fn cd_into_unlisted_dir_registers_it() {
        let mut transcript = started();
        transcript.process("$ cd b").unwrap();
        transcript.process("7 x").unwrap();

        let b = DirPath::root().join("b");
        assert_eq!(transcript.cursor(), Some(&b));
        assert!(transcript.tree().get(&DirPath::root()).unwrap().children().contains(&b));
        assert_eq!(transcript.tree().total_size(&DirPath::root()).unwrap(), 7);
    }

    #[test]
    fn cd_root_resets_cursor() {
        let mut transcript = started();
        transcript.process("$ cd a").unwrap();
        transcript.process("$ cd e").unwrap();
        transcript.process("$ cd /").unwrap();
        assert_eq!(transcript.cursor(), Some(&DirPath::root()));
    }

    #[test]
    fn duplicate_file_lines_add_up() {
        let mut transcript = started();
        transcript.process("10 f").unwrap();
        transcript.process("10 f").unwrap();
        assert_eq!(transcript.tree().get(&DirPath::root()).unwrap().direct_file_size(), 20);
    }

    #[test]
    fn error_keeps_earlier_mutations() {
        let mut transcript = started();
        transcript.process("10 f").unwrap();
        assert!(transcript.process("bogus").is_err());
        assert_eq!(transcript.tree().total_size(&DirPath::root()).unwrap(), 10);
    }

    #[test]
    fn sample_builds_four_dirs() {
        let tree = build_tree(TEST_INPUT.lines()).unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.total_size(&DirPath::root().join("a").join("e")).unwrap(), 584);
        assert_eq!(tree.total_size(&DirPath::root().join("a")).unwrap(), 94853);
        assert_eq!(tree.total_size(&DirPath::root().join("d")).unwrap(), 24933642);
        assert_eq!(tree.total_size(&DirPath::root()).unwrap(), 48381165);
    }
}
