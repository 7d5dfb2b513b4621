use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use tracing::debug;

use string_queue::{create, destroy, LinkedQueue, StringQueue};

/// buffer size used by `rh` when no capacity is given
const DEFAULT_CAPACITY: usize = 1024;

/// Executes a queue command script line by line, writing results to `out`.
///
/// Commands: `new`, `free`, `ih S [N]`, `it S [N]`, `rh [CAP]`, `size`,
/// `reverse`, `sort` and `show`. Text after `#` is ignored. Queue failures
/// (such as using the queue after `free`) are printed and the script goes
/// on; malformed commands stop it.
pub fn run<R: BufRead, W: Write>(input: R, mut out: W) -> Result<()> {
    let mut queue = None;
    for (index, line) in input.lines().enumerate() {
        let line = line.context("failed to read script")?;
        let command = line.split('#').next().unwrap_or_default().trim();
        if command.is_empty() {
            continue;
        }
        execute(&mut queue, command, &mut out)
            .with_context(|| format!("line {}: `{}`", index + 1, command))?;
    }
    destroy(queue);
    Ok(())
}

fn execute<W: Write>(
    queue: &mut Option<LinkedQueue>,
    command: &str,
    out: &mut W,
) -> Result<()> {
    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    match (name, args.as_slice()) {
        ("new", []) => {
            let released = destroy(queue.take());
            debug!(released, "queue replaced");
            *queue = create();
        }
        ("free", []) => {
            let released = destroy(queue.take());
            writeln!(out, "freed {released} elements")?;
            return Ok(());
        }
        ("ih" | "it", [value, count @ ..]) if count.len() <= 1 => {
            let count = parse_optional(count, 1).context("invalid repeat count")?;
            for _ in 0..count {
                let inserted = if name == "ih" {
                    queue.insert_head(value)
                } else {
                    queue.insert_tail(value)
                };
                if let Err(err) = inserted {
                    writeln!(out, "error: {err}")?;
                    break;
                }
            }
        }
        ("rh", capacity) if capacity.len() <= 1 => {
            let capacity =
                parse_optional(capacity, DEFAULT_CAPACITY).context("invalid buffer capacity")?;
            let mut buf = Vec::new();
            buf.try_reserve_exact(capacity)
                .with_context(|| format!("cannot allocate a {capacity} byte buffer"))?;
            buf.resize(capacity, 0u8);
            match queue.remove_head(Some(buf.as_mut_slice())) {
                Ok(()) => {
                    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
                    writeln!(out, "removed {:?}", String::from_utf8_lossy(&buf[..end]))?;
                }
                Err(err) => writeln!(out, "error: {err}")?,
            }
        }
        ("size", []) => {
            writeln!(out, "size = {}", queue.size())?;
            return Ok(());
        }
        ("reverse", []) => queue.reverse(),
        ("sort", []) => queue.sort(),
        ("show", []) => {}
        _ => bail!("unknown command or wrong number of arguments"),
    }
    show(queue, out)
}

fn parse_optional(args: &[&str], default: usize) -> Result<usize> {
    match args.first() {
        Some(arg) => Ok(arg.parse()?),
        None => Ok(default),
    }
}

fn show<W: Write>(queue: &Option<LinkedQueue>, out: &mut W) -> Result<()> {
    match queue {
        Some(queue) => writeln!(out, "q = {queue:?}")?,
        None => writeln!(out, "q = (absent)")?,
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::run;

    fn run_script(script: &str) -> String {
        let mut out = Vec::new();
        run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn reverse_then_remove() {
        let output = run_script(
            "new\n\
             it banana\n\
             ih apple\n\
             it cherry\n\
             size\n\
             reverse\n\
             rh 7\n\
             size\n\
             free\n",
        );
        assert_eq!(
            output,
            "q = []\n\
             q = [\"banana\"]\n\
             q = [\"apple\", \"banana\"]\n\
             q = [\"apple\", \"banana\", \"cherry\"]\n\
             size = 3\n\
             q = [\"cherry\", \"banana\", \"apple\"]\n\
             removed \"cherry\"\n\
             q = [\"banana\", \"apple\"]\n\
             size = 2\n\
             freed 2 elements\n"
        );
    }

    #[test]
    fn absent_queue_is_reported() {
        let output = run_script(
            "ih a\n\
             rh\n\
             size\n\
             sort\n\
             new\n\
             it x 3\n\
             rh 2\n\
             # comment\n\
             \n\
             free\n\
             show\n",
        );
        assert_eq!(
            output,
            "error: queue is absent\n\
             q = (absent)\n\
             error: queue is absent\n\
             q = (absent)\n\
             size = 0\n\
             q = (absent)\n\
             q = []\n\
             q = [\"x\", \"x\", \"x\"]\n\
             removed \"x\"\n\
             q = [\"x\", \"x\"]\n\
             freed 2 elements\n\
             q = (absent)\n"
        );
    }

    #[test]
    fn sort_and_truncate() {
        let output = run_script("new\nit a10\nit a2 # trailing comment\nit a1\nsort\nrh 2\nrh\n");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[4], r#"q = ["a1", "a2", "a10"]"#);
        assert_eq!(lines[5], r#"removed "a""#);
        assert_eq!(lines[7], r#"removed "a2""#);
    }

    #[test]
    fn remove_from_empty_queue() {
        let output = run_script("new\nrh\n");
        assert_eq!(output, "q = []\nerror: queue is empty\nq = []\n");
    }

    #[test]
    fn malformed_commands_stop_the_script() {
        let mut out = Vec::new();
        let err = run("new\nbogus\nsize\n".as_bytes(), &mut out).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));

        let err = run("new\nit\n".as_bytes(), Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("line 2: `it`"));

        let err = run("new\nit a many\n".as_bytes(), Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid repeat count"));
    }

    #[test]
    fn oversized_buffer_is_an_error() {
        let script = format!("new\nit a\nrh {}\n", usize::MAX);
        let mut out = Vec::new();
        let err = run(script.as_bytes(), &mut out).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("line 3"));
        assert!(message.contains("cannot allocate"));
    }
}
