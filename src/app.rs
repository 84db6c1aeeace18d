use crate::audio_processing::{OUTPUT_CODEC, concatenate_audio, resolve_bitrate};
use crate::chapters::{MetadataHeader, get_chapter_list};
use crate::cli::{Args, CombineArgs, Command};
use crate::ffmpeg::{check_dependency, check_ffmpeg_installation};
use crate::paths::parse_paths;
use crate::tags::{TagKey, batch_update_tag, read_tag_row};
use crate::task::CombineTask;
use crate::util::format_timestamp;
use anyhow::{Result, anyhow, bail};
use comfy_table::{Table, presets::UTF8_FULL};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_OUTPUT: &str = "audiobook.m4b";

pub fn run(args: Args, out: &mut dyn Write) -> Result<()> {
    let debug = args.debug;
    match args.command {
        Command::ShowTags { paths } => show_tags(&paths, out),
        Command::Number { paths, start } => {
            let files = parse_paths(&paths)?;
            let numbers = numbering(start, files.len())?;
            let updated = batch_update_tag(
                &files,
                &TagKey::TrackNumber,
                |i| numbers[i].to_string(),
                out,
            )?;
            report(out, "Numbered", updated, files.len())
        }
        Command::ChapterNumber {
            naming_scheme,
            paths,
            start,
        } => {
            let files = parse_paths(&paths)?;
            let numbers = numbering(start, files.len())?;
            let updated = batch_update_tag(
                &files,
                &TagKey::Title,
                |i| naming_scheme.replace("%n", &numbers[i].to_string()),
                out,
            )?;
            report(out, "Titled", updated, files.len())
        }
        Command::ChangeTitle { title, paths } => set_all(&paths, TagKey::Title, &title, out),
        Command::ChangeAlbum { album, paths } => set_all(&paths, TagKey::Album, &album, out),
        Command::ChangeAuthor { author_name, paths } => {
            set_all(&paths, TagKey::Artist, &author_name, out)
        }
        Command::ChangeNarrator {
            narrator_name,
            paths,
        } => set_all(&paths, TagKey::Composer, &narrator_name, out),
        Command::ChangeTag { tag, value, paths } => {
            let key: TagKey = tag.parse()?;
            set_all(&paths, key, &value, out)
        }
        Command::CombineFiles(combine) => combine_files(combine, debug, out),
        Command::CheckFfmpeg => handle_ffmpeg_check(out),
    }
}

/// The running numbers `start, start + 1, ...` for `count` files.
fn numbering(start: i64, count: usize) -> Result<Vec<i64>> {
    (0..count)
        .map(|i| {
            i64::try_from(i)
                .ok()
                .and_then(|offset| start.checked_add(offset))
                .ok_or_else(|| anyhow!("--start {} is too large to number {} files", start, count))
        })
        .collect()
}

fn set_all(paths: &[String], key: TagKey, value: &str, out: &mut dyn Write) -> Result<()> {
    let files = parse_paths(paths)?;
    let updated = batch_update_tag(&files, &key, |_| value.to_string(), out)?;
    report(out, &format!("Set {} on", key), updated, files.len())
}

fn report(out: &mut dyn Write, verb: &str, updated: usize, total: usize) -> Result<()> {
    if updated == total {
        writeln!(out, "✅ {} {} file(s)", verb, updated)?;
    } else {
        writeln!(
            out,
            "⚠️ {} {} of {} file(s), see errors above",
            verb, updated, total
        )?;
    }
    Ok(())
}

fn show_tags(paths: &[String], out: &mut dyn Write) -> Result<()> {
    let files = parse_paths(paths)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "File",
        "Title",
        "Album",
        "Author",
        "Album Artist",
        "Narrator",
        "Disc",
        "Track",
    ]);

    for file in &files {
        let row = match read_tag_row(file) {
            Ok(row) => row,
            Err(e) => {
                debug!("Skipping {}: {:?}", file.display(), e);
                writeln!(out, "⚠️ {}", e)?;
                continue;
            }
        };
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        let mut cells = vec![name];
        cells.extend(row.cells().iter().map(|c| c.to_string()));
        table.add_row(cells);
    }

    writeln!(out, "Give the terminal window some width to display the table properly.")?;
    writeln!(out, "{table}")?;
    Ok(())
}

fn combine_files(args: CombineArgs, debug: bool, out: &mut dyn Write) -> Result<()> {
    // Load task file if provided and merge with CLI args
    let task = CombineTask::load(args.task.as_deref())?.unwrap_or_default();
    let paths = if !args.paths.is_empty() {
        args.paths.clone()
    } else {
        task.files.clone()
    };
    let output = args
        .output
        .clone()
        .or_else(|| task.output.clone())
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    let requested_bitrate = args.bitrate.clone().or_else(|| task.bitrate.clone());
    let mut header = MetadataHeader::default();
    if let Some(title) = args.title.clone().or_else(|| task.title.clone()) {
        header.title = title;
    }
    if let Some(author) = args.author.clone().or_else(|| task.author.clone()) {
        header.artist = author;
    }

    let files = parse_paths(&paths)?;
    let output_path = PathBuf::from(&output);
    if files.iter().any(|f| same_file(f, &output_path)) {
        bail!("Input and output file cannot be the same: {}", output);
    }

    check_dependency("ffmpeg")?;
    check_dependency("ffprobe")?;

    writeln!(out, "ℹ️ Reading chapters from {} file(s)...", files.len())?;
    let chapters = get_chapter_list(&files, debug)?;

    let bitrate = match &requested_bitrate {
        Some(b) => {
            writeln!(out, "ℹ️ Using user-provided bitrate: {}", b)?;
            resolve_bitrate(&files, Some(b.as_str()), debug)?
        }
        None => {
            let detected = resolve_bitrate(&files, None, debug)?;
            writeln!(out, "ℹ️ Automatically detected bitrate: {}", detected)?;
            detected
        }
    };

    let mut plan = Table::new();
    plan.load_preset(UTF8_FULL)
        .set_header(vec!["#", "Chapter", "Duration", "Start", "End"]);
    for (i, chapter) in chapters.iter().enumerate() {
        plan.add_row(vec![
            (i + 1).to_string(),
            chapter.name.clone(),
            format_timestamp(chapter.duration),
            format_timestamp(chapter.start),
            format_timestamp(chapter.end),
        ]);
    }
    writeln!(out, "\n▶️ Chapter Plan:")?;
    writeln!(out, "{plan}")?;

    let total = chapters.last().map_or(0, |c| c.end);
    let mut info_table = Table::new();
    info_table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Parameter", "Value"]);
    info_table
        .add_row(vec!["Output File", output.as_str()])
        .add_row(vec!["Title", header.title.as_str()])
        .add_row(vec!["Author", header.artist.as_str()])
        .add_row(vec!["Codec", OUTPUT_CODEC])
        .add_row(vec!["Bitrate", bitrate.as_str()])
        .add_row(vec!["Total Duration", &format_timestamp(total)]);
    writeln!(out, "\n▶️ Job Details:")?;
    writeln!(out, "{info_table}")?;

    if args.yes {
        writeln!(out, "\n--yes flag provided, proceeding without confirmation.")?;
    } else {
        writeln!(out, "\nProceed with this plan? [y/N]")?;
        out.flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            writeln!(out, "Aborting operation.")?;
            return Ok(());
        }
    }

    // Optionally write the task to a file (after confirmation)
    if let Some(write_task_file) = &args.write_task_file {
        let task_path = match write_task_file {
            Some(path) => PathBuf::from(path),
            None => output_path.with_extension("json"),
        };
        let resolved = CombineTask {
            files: files.iter().map(|f| f.display().to_string()).collect(),
            output: Some(output.clone()),
            bitrate: Some(bitrate.clone()),
            title: Some(header.title.clone()),
            author: Some(header.artist.clone()),
        };
        resolved.save(&task_path)?;
        writeln!(out, "✅ Wrote task to {}", task_path.display())?;
    }

    writeln!(out, "\n▶️ Combining {} file(s)...", files.len())?;
    info!("Encoding {} chapter(s) into {}", chapters.len(), output);
    concatenate_audio(&files, &chapters, &header, &output_path, &bitrate, debug)?;

    writeln!(out, "✅ Processing complete! Output: {}", output)?;
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn handle_ffmpeg_check(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "🔍 Checking FFmpeg installation...\n")?;

    let check_result = check_ffmpeg_installation();

    // Display FFmpeg status
    if check_result.ffmpeg_available {
        if let Some(version_info) = &check_result.ffmpeg_version {
            writeln!(out, "✅ FFmpeg found:")?;
            writeln!(
                out,
                "   Version: {}.{}.{}",
                version_info.major, version_info.minor, version_info.patch
            )?;

            if version_info.is_compatible {
                writeln!(out, "   Status: ✅ Compatible (minimum required: 4.0.0)")?;
            } else {
                writeln!(out, "   Status: ❌ Too old (minimum required: 4.0.0)")?;
            }
        } else {
            writeln!(out, "⚠️  Could not parse FFmpeg version from output")?;
        }
    } else if let Some(error) = &check_result.error {
        writeln!(out, "❌ FFmpeg not found in PATH")?;
        writeln!(
            out,
            "   Please install FFmpeg and ensure it's accessible from the command line"
        )?;
        bail!("FFmpeg is required but not installed: {}", error);
    }

    writeln!(out)?;

    // Display FFprobe status
    if check_result.ffprobe_available {
        writeln!(out, "✅ FFprobe found and working")?;
    } else {
        writeln!(out, "❌ FFprobe not found in PATH")?;
        bail!("FFprobe is required but not installed");
    }

    writeln!(out)?;

    if check_result.aac_encoder_available {
        writeln!(out, "✅ Required encoder '{}' is available", OUTPUT_CODEC)?;
    } else {
        writeln!(out, "❌ Required encoder '{}' not found", OUTPUT_CODEC)?;
        writeln!(out, "   This encoder is needed to combine files")?;
    }

    writeln!(out, "\n🎉 FFmpeg check complete!")?;
    Ok(())
}
