/// Terminal preview of a camera over a reference scene
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};
use vantage_core::{Camera, CameraError};

pub mod logging;
pub mod renderer;
pub mod report;
pub mod scene;

pub use renderer::AsciiRenderer;
pub use scene::Segment;

/// Interactive application stepping a camera through its frames
pub struct TerminalApp {
    camera: Camera,
    playback: Playback,
    scene: Vec<Segment>,
    renderer: AsciiRenderer,
    running: bool,
    playing: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
    status: Option<String>,
}

impl TerminalApp {
    pub fn new(camera: Camera) -> anyhow::Result<Self> {
        let (width, height) = terminal::size()?;
        // Leave the top row for the status line
        let renderer = AsciiRenderer::new(width as usize, height.saturating_sub(1).max(1) as usize);

        let mut app = Self {
            playback: Playback::new(&camera),
            camera,
            scene: scene::reference_scene(),
            renderer,
            running: true,
            playing: false,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            status: None,
        };
        app.refresh_matrices()?;
        Ok(app)
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> anyhow::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?)?;
            }

            if self.playing {
                self.step_frame(1);
            }

            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> anyhow::Result<()> {
        match event {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Char(' ') => self.playing = !self.playing,
                KeyCode::Right | KeyCode::Char('n') => self.step_frame(1),
                KeyCode::Left | KeyCode::Char('p') => self.step_frame(-1),
                KeyCode::Home => self.jump_to(0),
                _ => {}
            },
            Event::Resize(width, height) => {
                self.renderer
                    .resize(width as usize, height.saturating_sub(1).max(1) as usize);
                self.refresh_matrices()?;
            }
            _ => {}
        }
        Ok(())
    }

    fn step_frame(&mut self, delta: i64) {
        let result = self.playback.step(&mut self.camera, delta);
        self.report(result);
    }

    fn jump_to(&mut self, frame: usize) {
        let result = self.playback.jump_to(&mut self.camera, frame);
        self.report(result);
    }

    fn report(&mut self, result: Result<(), CameraError>) {
        match result {
            Ok(()) => self.status = None,
            Err(err) => {
                let frame = self.playback.playhead();
                log::warn!("cannot show frame {}: {}", frame, err);
                self.status = Some(format!("frame {}: {}", frame + 1, err));
            }
        }
    }

    fn refresh_matrices(&mut self) -> anyhow::Result<()> {
        let (width, height) = self.renderer.viewport_size();
        self.camera.update_matrices(width, height)?;
        Ok(())
    }

    fn render(&mut self) -> anyhow::Result<()> {
        self.renderer.clear();
        self.renderer.render_segments(&self.scene, &self.camera);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 1))?;
        self.renderer.draw(&mut stdout)?;

        let header = format!(
            "Vantage | {} camera | frame {}/{} {}| FPS: {:.1} | Left/Right=Step Space=Play Q=Quit",
            self.camera.kind().name(),
            self.playback.playhead() + 1,
            self.camera.n_frames(),
            if self.playing { "(playing) " } else { "" },
            self.fps
        );
        let (header, color) = match &self.status {
            Some(status) => (format!("{} | {}", header, status), Color::Red),
            None => (header, Color::Yellow),
        };

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetForegroundColor(color),
            Print(header),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Playhead over a camera's frames.
///
/// The playhead moves even when the camera rejects a frame (for instance a
/// degenerate pose), so stepping past a bad frame continues with the next
/// one while the camera keeps showing the last good frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playback {
    playhead: usize,
}

impl Playback {
    pub fn new(camera: &Camera) -> Self {
        Self {
            playhead: camera.current_frame(),
        }
    }

    pub fn playhead(&self) -> usize {
        self.playhead
    }

    /// Advance by `delta` frames, wrapping around the sequence.
    pub fn step(&mut self, camera: &mut Camera, delta: i64) -> Result<(), CameraError> {
        let n = camera.n_frames() as i64;
        let next = (self.playhead as i64 + delta).rem_euclid(n);
        self.jump_to(camera, next as usize)
    }

    pub fn jump_to(&mut self, camera: &mut Camera, frame: usize) -> Result<(), CameraError> {
        if frame >= camera.n_frames() {
            return Err(CameraError::FrameOutOfRange {
                index: frame as i64,
                n_frames: camera.n_frames(),
            });
        }
        self.playhead = frame;
        camera.set_current_frame(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn camera_with_bad_frame() -> Camera {
        // frame 1 looks from the target onto itself
        let positions = vec![
            Point3::new(0.0, 0.0, 5.0),
            Point3::origin(),
            Point3::new(5.0, 0.0, 0.0),
        ];
        let mut camera =
            Camera::perspective(positions, vec![Point3::origin()], 45.0, 80, 24, 0.1, 100.0).unwrap();
        camera.update_matrices(80, 48).unwrap();
        camera
    }

    #[test]
    fn test_step_skips_past_bad_frame() {
        let mut camera = camera_with_bad_frame();
        let mut playback = Playback::new(&camera);

        assert_eq!(
            playback.step(&mut camera, 1),
            Err(CameraError::DegenerateForward)
        );
        assert_eq!(playback.playhead(), 1);
        assert_eq!(camera.current_frame(), 0);

        playback.step(&mut camera, 1).unwrap();
        assert_eq!(playback.playhead(), 2);
        assert_eq!(camera.current_frame(), 2);
    }

    #[test]
    fn test_step_wraps_both_ways() {
        let mut camera = camera_with_bad_frame();
        let mut playback = Playback::new(&camera);

        playback.step(&mut camera, -1).unwrap();
        assert_eq!(camera.current_frame(), 2);
        playback.step(&mut camera, 1).unwrap();
        assert_eq!(camera.current_frame(), 0);
    }

    #[test]
    fn test_jump_out_of_range_keeps_playhead() {
        let mut camera = camera_with_bad_frame();
        let mut playback = Playback::new(&camera);
        assert!(matches!(
            playback.jump_to(&mut camera, 3),
            Err(CameraError::FrameOutOfRange { index: 3, n_frames: 3 })
        ));
        assert_eq!(playback.playhead(), 0);
    }
}
